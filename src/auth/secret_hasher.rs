/// Refresh-Secret Hashing and Verification
///
/// Refresh secrets are hashed with bcrypt before storage: deliberately
/// slow, salted per call, one-way. No other component compares secrets
/// directly.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// A well-formed bcrypt hash that matches no issued secret.
///
/// Verified against when no session matches a presented key, so the
/// missing-session and wrong-secret paths take comparable time.
pub const DUMMY_SECRET_HASH: &str =
    "$2b$12$C6UzMDM.H6dfI/f/IKcEeOZRGX7i1mDwZDBkzr5O3uEKbLxGS9pC2";

/// Hash a refresh secret for storage.
///
/// Two hashes of the same secret differ (random salt).
///
/// # Errors
/// Returns `AppError::Hashing` only when the bcrypt primitive fails.
pub fn hash_secret(secret: &str) -> Result<String, AppError> {
    hash(secret, DEFAULT_COST).map_err(|e| AppError::Hashing(e.to_string()))
}

/// Verify a candidate secret against a stored hash.
///
/// Never fails: a mismatch, a malformed hash, and an internal bcrypt
/// error all come back as `false`, so the caller cannot tell them apart.
pub fn verify_secret(candidate: &str, hashed: &str) -> bool {
    verify(candidate, hashed).unwrap_or(false)
}
