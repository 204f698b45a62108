//! Errors of the note operations
//!
//! Everything surfaces as a message for the user, nothing is retried

use core::fmt;

use crate::storage;

/// Error of a session, repository or editor operation
#[derive(Debug)]
pub enum Error {
    /// The input is refused before the storage is contacted
    Validation(String),

    /// The record does not exist or belongs to somebody else
    NotFound(&'static str),

    /// No valid session
    Unauthorized(String),

    /// The operation does not fit the current state
    Conflict(&'static str),

    /// The storage reported a failure
    Backend(storage::Error),

    /// Something went wrong on our side
    Internal(String),
}

impl Error {
    /// Create a validation error
    pub fn validation<M>(message: M) -> Self
    where
        M: ToString,
    {
        Error::Validation(message.to_string())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Validation(message) | Error::Unauthorized(message) | Error::Internal(message) => {
                write!(f, "{message}")
            }
            Error::NotFound(message) | Error::Conflict(message) => write!(f, "{message}"),
            Error::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl From<storage::Error> for Error {
    fn from(err: storage::Error) -> Self {
        Error::Backend(err)
    }
}

/// Result type for all note operations
pub type Result<T> = core::result::Result<T, Error>;
