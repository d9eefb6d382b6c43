//! Salted credential hashing.
//!
//! Credentials are stored as Argon2id PHC strings; the plaintext password
//! never reaches the store.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::DomainError;

/// Hashes a password with a freshly generated salt.
pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::PasswordHash(e.to_string()))
}

/// Checks a password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored hash
/// cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, DomainError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| DomainError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
