//! User and session API

use axum::extract::State;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::session::Session;
use crate::session::Token;
use crate::storage::Storage;
use crate::users::User;

use super::AppState;
use super::Error;
use super::Form;
use super::Success;

/// The user response information
///
/// A subset of all the information, ready to be serialized for the outside world
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// The user ID
    pub id: Uuid,

    /// The email address
    pub email: String,

    /// Signed up at
    pub created_at: NaiveDateTime,
}

impl UserResponse {
    /// Create a user response from a [`User`](User)
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// The current identity, if any
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The signed in user, `null` without a valid token
    pub user: Option<UserResponse>,
}

/// Sign up and sign in form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsForm {
    /// Email address of the user
    email: String,
    /// Password of the user
    password: String,
}

/// Sign up as a new user
///
/// The response carries a token right away, no separate sign in needed
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "someone@example.com", "password": "verysecret" }' \
///     http://localhost:6000/api/users
/// ```
///
/// Response
/// ```json
/// { "data": { "token_type": "Bearer", "expires_in": 3600, "access_token": "some token" } }
/// ```
pub async fn sign_up<S: Storage>(
    State(state): State<AppState<S>>,
    Form(form): Form<CredentialsForm>,
) -> Result<Success<Token>, Error> {
    let token = state.sessions.sign_up(&form.email, &form.password).await?;

    Ok(Success::created(token))
}

/// Get a token for a user session
///
/// The token can then be used to access the rest of the API routes by using it in the
/// `Authorization` header
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "someone@example.com", "password": "verysecret" }' \
///     http://localhost:6000/api/users/token
/// ```
///
/// Response
/// ```json
/// { "data": { "token_type": "Bearer", "expires_in": 3600, "access_token": "some token" } }
/// ```
pub async fn token<S: Storage>(
    State(state): State<AppState<S>>,
    Form(form): Form<CredentialsForm>,
) -> Result<Success<Token>, Error> {
    let token = state.sessions.sign_in(&form.email, &form.password).await?;

    Ok(Success::ok(token))
}

/// Get the current identity
///
/// Never fails on a missing or invalid token, the user is `null` then
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/session
/// ```
///
/// Response:
/// ```json
/// { "data": { "user": { "id": "<uuid>", "email": "someone@example.com" ... } } }
/// ```
pub async fn current(session: Option<Session>) -> Result<Success<SessionResponse>, Error> {
    let user = session.as_deref().map(UserResponse::from_user);

    Ok(Success::ok(SessionResponse { user }))
}

/// Sign out, invalidates all tokens of the user
///
/// Request:
/// ```sh
/// curl -v -XPOST -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/session/sign-out
/// ```
pub async fn sign_out<S: Storage>(
    State(state): State<AppState<S>>,
    session: Session,
) -> Result<Success<&'static str>, Error> {
    state.sessions.sign_out(&session).await?;

    Ok(Success::<&'static str>::no_content())
}
