//! One-way, salted, adaptive password hashing (Argon2id, PHC strings).

use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

/// Hash a plaintext password into a self-contained PHC string. A fresh random
/// salt is drawn per call, so hashing the same plaintext twice yields distinct
/// digests.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

/// Verify a plaintext against a stored PHC string. A malformed hash is treated
/// as a mismatch, never an error.
pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let phc = hash_password("Abcdef1!").unwrap();
        assert!(verify_password(&phc, "Abcdef1!"));
        assert!(!verify_password(&phc, "Abcdef1?"));
    }

    #[test]
    fn same_plaintext_hashes_differently() {
        let a = hash_password("Abcdef1!").unwrap();
        let b = hash_password("Abcdef1!").unwrap();
        assert_ne!(a, b);
        assert!(verify_password(&a, "Abcdef1!"));
        assert!(verify_password(&b, "Abcdef1!"));
    }

    #[test]
    fn malformed_hash_is_a_mismatch_not_an_error() {
        assert!(!verify_password("not-a-phc-string", "Abcdef1!"));
        assert!(!verify_password("", "Abcdef1!"));
    }
}
