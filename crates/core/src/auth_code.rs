//! One-time e-mail verification codes used during registration.
//!
//! Codes are six decimal digits. Only their SHA-256 hex digest is stored.

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Number of digits in a verification code.
pub const CODE_LENGTH: usize = 6;

/// Default code lifetime when `AUTH_CODE_TTL_MINS` is not configured.
pub const DEFAULT_TTL_MINS: i64 = 15;

/// Wrong guesses allowed against one code before it is invalidated.
pub const MAX_CODE_ATTEMPTS: i32 = 5;

/// Generate a random zero-padded six-digit code.
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

/// SHA-256 hex digest of a code.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Validate the shape of a user-supplied code.
pub fn validate_code_format(code: &str) -> Result<(), CoreError> {
    if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "Verification code must be {CODE_LENGTH} digits"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert!(validate_code_format(&code).is_ok(), "bad code {code}");
        }
    }

    #[test]
    fn hash_is_stable_sha256_hex() {
        let h = hash_code("012345");
        assert_eq!(h, hash_code("012345"));
        assert_eq!(h.len(), 64);
        assert_ne!(h, hash_code("012346"));
    }

    #[test]
    fn malformed_codes_rejected() {
        assert!(validate_code_format("12345").is_err());
        assert!(validate_code_format("1234567").is_err());
        assert!(validate_code_format("12a456").is_err());
    }
}
