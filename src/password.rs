//! Password utilities

use argon2::Argon2;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;

use crate::error::Error;

/// Minimal amount of characters in a password
pub const MINIMAL_LENGTH: usize = 8;

/// Generate a random secret, like a temporary JWT secret
pub fn generate() -> String {
    SaltString::generate(&mut OsRng).to_string()
}

/// Is the password long enough?
pub fn is_strong_enough(password: &str) -> bool {
    password.chars().count() >= MINIMAL_LENGTH
}

/// Hash a given password
pub fn hash(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hashed_password| hashed_password.to_string())
        .map_err(|err| Error::Internal(format!("Could not hash password: {err}")))
}

/// Verify a given password against a given hash
///
/// An unreadable hash never verifies
pub fn verify(hashed_password: &str, password: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hashed_password) else {
        tracing::error!("Stored password hash can not be parsed");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
