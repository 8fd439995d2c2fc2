// SPDX-License-Identifier: MIT

//! Password hashing and verification.
//!
//! bcrypt embeds a per-record random salt in the digest, and `bcrypt::verify`
//! compares in constant time.

use crate::error::AppError;

/// Hash a plaintext password with the configured work factor.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, AppError> {
    bcrypt::hash(plaintext, cost)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// Verify a plaintext password against a stored digest.
///
/// A malformed digest counts as a mismatch rather than an error, so login
/// never turns a corrupt credential record into a 500.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    bcrypt::verify(plaintext, digest).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_then_verify() {
        let digest = hash_password("secret1", TEST_COST).unwrap();
        assert!(verify_password("secret1", &digest));
        assert!(!verify_password("secret2", &digest));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("secret1", TEST_COST).unwrap();
        let b = hash_password("secret1", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_digest_is_mismatch() {
        assert!(!verify_password("secret1", "not-a-bcrypt-digest"));
    }
}
