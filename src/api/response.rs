//! API response helpers

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

/// Hold data for a successful API interaction
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    data: Option<V>,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(data: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            data: Some(data),
        }
    }

    pub fn created(data: V) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            data: Some(data),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status_code: StatusCode::NO_CONTENT,
            data: None,
        }
    }
}

#[derive(Serialize)]
struct DataWrapper<D>
where
    D: Serialize,
{
    data: D,
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        if let Some(data) = self.data {
            (self.status_code, Json(DataWrapper { data })).into_response()
        } else {
            self.status_code.into_response()
        }
    }
}

/// Hold data for a failed API interaction
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    message: String,
    description: Option<String>,
}

impl Error {
    fn new<M>(status_code: StatusCode, message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code,
            message: message.to_string(),
            description: None,
        }
    }

    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_description<M>(&self, description: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: self.status_code,
            message: self.message.clone(),
            description: Some(description.to_string()),
        }
    }
}

impl From<crate::error::Error> for Error {
    fn from(err: crate::error::Error) -> Self {
        use crate::error::Error as NoteError;

        match err {
            NoteError::Validation(message) => Error::bad_request(message),
            NoteError::NotFound(message) => Error::not_found(message),
            NoteError::Unauthorized(message) => Error::forbidden(message),
            NoteError::Conflict(message) => Error::conflict(message),
            NoteError::Backend(err) => {
                tracing::error!("Storage failure: {err}");

                Error::internal_server_error(err)
            }
            NoteError::Internal(message) => {
                tracing::error!("Internal failure: {message}");

                Error::internal_server_error(message)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorWrapper<D>
where
    D: Serialize,
{
    error: D,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<D>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(ErrorWrapper {
                error: self.message,
                description: self.description,
            }),
        )
            .into_response()
    }
}
