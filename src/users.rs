//! Users
//!
//! Everybody owns their own notes, folders and tags

use chrono::naive::NaiveDateTime;
use uuid::Uuid;

/// A registered user
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    /// User ID
    pub id: Uuid,

    /// Session ID, rotated on sign-out to invalidate issued tokens
    pub session_id: Uuid,

    /// Email address, always lowercase
    pub email: String,

    /// Argon2 hash of the password
    pub hashed_password: String,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    pub updated_at: NaiveDateTime,
}

/// Normalize an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal sanity check on an (already normalized) email address
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
