//! Sessions
//!
//! Who is signed in. Every note operation needs a [`Session`], passed along explicitly.

use std::ops::Deref;
use std::sync::Arc;

use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Error;
use crate::error::Result;
use crate::password;
use crate::storage::CreateUserValues;
use crate::storage::Storage;
use crate::users::User;
use crate::users::is_valid_email;
use crate::users::normalize_email;

/// How long an access token is valid, in seconds
const TOKEN_EXPIRES_IN: i64 = 3600;

/// The keys used for encoding/decoding JWT tokens
#[derive(Clone)]
pub struct JwtKeys {
    /// The encoding key
    encoding: EncodingKey,

    /// The decoding key
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create new encoding/decoding keys, derived from a secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// The JWT claims to identify a user
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    /// The user ID
    sub: Uuid,

    /// Expiration as UNIX timestamp
    exp: i64,

    /// The session ID, used to invalidate tokens before they expire
    jti: Uuid,
}

/// Token information served to the user
#[derive(Debug, Serialize)]
pub struct Token {
    /// Type of the token: Bearer
    #[allow(clippy::struct_field_names)]
    token_type: String,

    /// In how many seconds does the token expire
    expires_in: i64,

    /// The access token to provide to follow up requests in the Authorization header
    #[allow(clippy::struct_field_names)]
    access_token: String,
}

/// An authenticated user
///
/// Cheap to clone
#[derive(Clone, Debug)]
pub struct Session {
    /// The signed in user
    user: Arc<User>,
}

impl Session {
    /// Create a session for a user
    pub fn new(user: User) -> Self {
        Self {
            user: Arc::new(user),
        }
    }
}

impl Deref for Session {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

/// Provides sessions: sign up, sign in, token resolution and sign out
#[derive(Clone)]
pub struct SessionProvider<S: Storage> {
    /// Storage of the users
    storage: S,

    /// Keys to sign and verify tokens
    jwt_keys: JwtKeys,
}

impl<S: Storage> SessionProvider<S> {
    /// Create a session provider
    pub fn new(storage: S, jwt_keys: JwtKeys) -> Self {
        Self { storage, jwt_keys }
    }

    /// Register a new user and sign in right away
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Token> {
        let email = normalize_email(email);

        if !is_valid_email(&email) {
            return Err(Error::validation("Invalid email address"));
        }

        if !password::is_strong_enough(password) {
            return Err(Error::validation(format!(
                "Password needs at least {} characters",
                password::MINIMAL_LENGTH
            )));
        }

        if self.storage.find_single_user_by_email(&email).await?.is_some() {
            return Err(Error::validation("Email address is already registered"));
        }

        let hashed_password = password::hash(password)?;

        let values = CreateUserValues {
            session_id: &Uuid::new_v4(),
            email: &email,
            hashed_password: &hashed_password,
        };

        let user = self.storage.create_user(&values).await?;

        tracing::info!("User {} signed up", user.id);

        self.generate_token(&user)
    }

    /// Sign in with email address and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Token> {
        let email = normalize_email(email);

        let user = self.storage.find_single_user_by_email(&email).await?;

        match user {
            Some(user) if password::verify(&user.hashed_password, password) => {
                tracing::debug!("User {} signed in", user.id);

                self.generate_token(&user)
            }
            _ => Err(Error::validation("Invalid credentials")),
        }
    }

    /// Resolve an access token into a session
    pub async fn resolve(&self, access_token: &str) -> Result<Session> {
        use jsonwebtoken::Validation;
        use jsonwebtoken::decode;

        let token_data = decode::<Claims>(access_token, &self.jwt_keys.decoding, &Validation::default())
            .map_err(|err| Error::Unauthorized(format!("Invalid token: {err}")))?;

        let claims = token_data.claims;

        let user = self
            .storage
            .find_single_user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| Error::Unauthorized("Could not find user".to_string()))?;

        // mechanism to invalidate JWT tokens
        if claims.jti != user.session_id {
            return Err(Error::Unauthorized("Token expired".to_string()));
        }

        Ok(Session::new(user))
    }

    /// Sign out, every token of the user stops working
    pub async fn sign_out(&self, session: &Session) -> Result<()> {
        self.storage.rotate_session(session, &Uuid::new_v4()).await?;

        tracing::debug!("User {} signed out", session.id);

        Ok(())
    }

    /// Generate a token for the outside world for a given user
    fn generate_token(&self, user: &User) -> Result<Token> {
        use jsonwebtoken::Header;
        use jsonwebtoken::encode;

        let claims = Claims {
            sub: user.id,
            exp: chrono::Utc::now().timestamp() + TOKEN_EXPIRES_IN,
            jti: user.session_id,
        };

        let access_token = encode(&Header::default(), &claims, &self.jwt_keys.encoding)
            .map_err(|err| Error::Internal(format!("Could not create token: {err}")))?;

        Ok(Token {
            token_type: "Bearer".to_string(),
            expires_in: TOKEN_EXPIRES_IN,
            access_token,
        })
    }
}

#[cfg(test)]
impl Token {
    /// The raw access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Memory;

    use super::*;

    fn provider() -> SessionProvider<Memory> {
        SessionProvider::new(Memory::new(), JwtKeys::new(b"verysecret"))
    }

    #[tokio::test]
    async fn test_sign_up_and_resolve() {
        let provider = provider();

        let token = provider
            .sign_up(" Someone@Example.com", "verysecret")
            .await
            .unwrap();

        let session = provider.resolve(token.access_token()).await.unwrap();
        assert_eq!("someone@example.com", session.email);
    }

    #[tokio::test]
    async fn test_sign_up_validation() {
        let provider = provider();

        let result = provider.sign_up("someone", "verysecret").await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = provider.sign_up("someone@example.com", "short").await;
        assert!(matches!(result, Err(Error::Validation(_))));

        provider
            .sign_up("someone@example.com", "verysecret")
            .await
            .unwrap();

        let result = provider.sign_up("SOMEONE@example.com", "verysecret").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_sign_in() {
        let provider = provider();

        provider
            .sign_up("someone@example.com", "verysecret")
            .await
            .unwrap();

        assert!(provider
            .sign_in("someone@example.com", "verysecret")
            .await
            .is_ok());

        let result = provider.sign_in("someone@example.com", "notsosecret").await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = provider.sign_in("nobody@example.com", "verysecret").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_sign_out_invalidates_tokens() {
        let provider = provider();

        let token = provider
            .sign_up("someone@example.com", "verysecret")
            .await
            .unwrap();

        let session = provider.resolve(token.access_token()).await.unwrap();
        provider.sign_out(&session).await.unwrap();

        let result = provider.resolve(token.access_token()).await;
        assert!(matches!(result, Err(Error::Unauthorized(message)) if message == "Token expired"));
    }

    #[tokio::test]
    async fn test_resolve_garbage() {
        let provider = provider();

        let result = provider.resolve("not-a-token").await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }
}
