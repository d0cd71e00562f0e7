//! Password and recovery-code hashing.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sha2::{Digest, Sha256};

use super::AuthError;

/// Hash a password into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// [`hash_password`] on the blocking pool; argon2 is CPU-bound.
pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
}

/// [`verify_password`] on the blocking pool. A failed task is an error, not a mismatch.
pub async fn verify_password_blocking(
    password: String,
    stored_hash: String,
) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Recovery codes are stored as SHA-256 hex; they are random and single use.
pub fn hash_recovery_code(code: &str) -> String {
    format!("{:x}", Sha256::digest(code.as_bytes()))
}
