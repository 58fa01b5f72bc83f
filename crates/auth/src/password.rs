//! Password hashing.
//!
//! bcrypt with a configurable cost factor (default 10, the work factor the
//! stored hashes were created with). Hashing is CPU-bound; callers on an
//! async runtime offload it, see [`crate::CredentialVerifier`] and the
//! registration handler in `hrm-api`.

use thiserror::Error;

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Hash a plaintext password with the given bcrypt cost.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(plaintext, cost)?)
}

/// Verify a plaintext password against a stored bcrypt hash.
///
/// An unparseable hash counts as a failed verification, not an error: the
/// caller must not be able to distinguish "bad password" from "bad hash".
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the test suite fast; production uses the config value.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify_succeeds() {
        let hash = hash_password("hunter2", TEST_COST).unwrap();
        assert!(verify_password("hunter2", &hash));
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("hunter2", TEST_COST).unwrap();
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("hunter2", TEST_COST).unwrap();
        let b = hash_password("hunter2", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
        assert!(!verify_password("hunter2", ""));
    }
}
