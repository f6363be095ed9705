//! Password hashing and strength policy.
//!
//! Hashes are salted bcrypt with a fixed work factor; the cost is the knob
//! that keeps offline brute force expensive while login latency stays bounded.

use crate::error::{AppError, AuthError};

/// bcrypt work factor. 2^12 rounds.
const HASH_COST: u32 = 12;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Hashes a password with a fresh random salt. Hashing the same password
/// twice yields different strings. A hashing failure is a server fault,
/// never a caller fault.
pub fn hash(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, HASH_COST).map_err(|e| AppError::InternalError(e.to_string()))
}

/// Verifies a password against a stored hash. A malformed hash is treated as
/// a mismatch, never an error.
pub fn verify(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

/// Checks the password strength policy: at least 8 characters, at least one
/// uppercase letter, at least one digit. The first failed check is the one
/// reported.
pub fn validate_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(
            "must be at least 8 characters".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::WeakPassword(
            "must contain an uppercase letter".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword("must contain a digit".into()));
    }
    Ok(())
}
