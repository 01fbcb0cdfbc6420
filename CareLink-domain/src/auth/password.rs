use std::env;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::token::SecurityError;

const SCHEME: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 password hashing.
///
/// Hashes are encoded as `pbkdf2_sha256$<iterations>$<salt_b64>$<hash_b64>` so
/// the iteration count can be raised without invalidating stored passwords.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    pub const DEFAULT_ITERATIONS: u32 = 600_000;

    pub fn new(iterations: u32) -> Self {
        Self { iterations: iterations.max(1) }
    }

    /// Read `PASSWORD_HASH_ITERATIONS`
    pub fn from_env() -> Self {
        let iterations = env::var("PASSWORD_HASH_ITERATIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(Self::DEFAULT_ITERATIONS);
        Self::new(iterations)
    }

    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);

        let digest = derive(password, &salt, self.iterations);
        format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            STANDARD.encode(salt),
            STANDARD.encode(digest)
        )
    }

    /// Check a password against an encoded hash in constant time
    pub fn verify(&self, password: &str, encoded: &str) -> Result<bool, SecurityError> {
        let mut parts = encoded.split('$');
        let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) =
            (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(SecurityError::MalformedHash);
        };

        let iterations: u32 = iterations.parse().map_err(|_| SecurityError::MalformedHash)?;
        let salt = STANDARD.decode(salt).map_err(|_| SecurityError::MalformedHash)?;
        let expected = STANDARD.decode(expected).map_err(|_| SecurityError::MalformedHash)?;
        if iterations == 0 || expected.len() != HASH_LEN {
            return Err(SecurityError::MalformedHash);
        }

        let actual = derive(password, &salt, iterations);
        Ok(actual[..].ct_eq(&expected[..]).unwrap_u8() == 1)
    }

    /// Spend the same work as a real verification. Used when the account does not exist.
    pub fn verify_dummy(&self, password: &str) {
        let _ = derive(password, &[0u8; SALT_LEN], self.iterations);
    }
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(1_000)
    }

    #[test]
    fn test_hash_and_verify() {
        let encoded = hasher().hash("correct horse battery");
        assert!(encoded.starts_with("pbkdf2_sha256$1000$"));
        assert!(hasher().verify("correct horse battery", &encoded).unwrap());
        assert!(!hasher().verify("wrong password", &encoded).unwrap());
    }

    #[test]
    fn test_salt_is_random() {
        let a = hasher().hash("same password");
        let b = hasher().hash("same password");
        assert_ne!(a, b);
    }

    #[test]
    fn test_iterations_read_from_stored_hash() {
        let encoded = PasswordHasher::new(1_500).hash("password123");
        assert!(hasher().verify("password123", &encoded).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        assert!(hasher().verify("x", "plaintext").is_err());
        assert!(hasher().verify("x", "pbkdf2_sha256$abc$c2FsdA==$aGFzaA==").is_err());
        assert!(hasher().verify("x", "bcrypt$10$c2FsdA==$aGFzaA==").is_err());
    }
}
