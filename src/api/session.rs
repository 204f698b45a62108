//! Session extractor
//!
//! Resolve the session from the request based on the Authorization header

use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::extract::OptionalFromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::error::Error as NoteError;
use crate::session::Session;
use crate::storage::Storage;

use super::AppState;
use super::Error;

/// Get the bearer token, if provided
async fn bearer_token(parts: &mut Parts) -> Option<Bearer> {
    parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .ok()
        .map(|TypedHeader(Authorization(bearer))| bearer)
}

impl<S: Storage> FromRequestParts<AppState<S>> for Session {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let bearer = bearer_token(parts)
            .await
            .ok_or_else(|| Error::forbidden("Missing API token"))?;

        Ok(state.sessions.resolve(bearer.token()).await?)
    }
}

/// No session is fine, a broken storage is not
impl<S: Storage> OptionalFromRequestParts<AppState<S>> for Session {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(bearer) = bearer_token(parts).await else {
            return Ok(None);
        };

        match state.sessions.resolve(bearer.token()).await {
            Ok(session) => Ok(Some(session)),
            Err(NoteError::Unauthorized(reason)) => {
                tracing::debug!("Ignoring token: {reason}");

                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
