// src/services/password.rs
// DOCUMENTATION: Password hashing and verification
// PURPOSE: PBKDF2-HMAC-SHA256 hashes stored as
// `pbkdf2_sha256$<iterations>$<salt>$<base64 digest>`

use base64::{engine::general_purpose::STANDARD, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::{distributions::Alphanumeric, Rng};
use sha2::Sha256;
use subtle::ConstantTimeEq;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LENGTH: usize = 22;
const DIGEST_LENGTH: usize = 32;

/// Hashes and verifies passwords with a fixed iteration count for new hashes
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Hash a raw password with a fresh random salt
    pub fn hash(&self, password: &str) -> String {
        let salt: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SALT_LENGTH)
            .map(char::from)
            .collect();
        self.hash_with_salt(password, &salt)
    }

    fn hash_with_salt(&self, password: &str, salt: &str) -> String {
        let digest = derive(password, salt, self.iterations);
        format!(
            "{}${}${}${}",
            ALGORITHM,
            self.iterations,
            salt,
            STANDARD.encode(digest)
        )
    }

    /// Check a raw password against an encoded hash
    /// DOCUMENTATION: Uses the iteration count stored in the hash, so hashes
    /// written under a different configuration keep verifying.
    /// Malformed hashes never verify.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let mut parts = encoded.splitn(4, '$');
        let (algorithm, iterations, salt, expected) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(a), Some(i), Some(s), Some(h)) => (a, i, s, h),
                _ => return false,
            };

        if algorithm != ALGORITHM {
            return false;
        }

        let iterations = match iterations.parse::<u32>() {
            Ok(i) if i > 0 => i,
            _ => return false,
        };

        let expected = match STANDARD.decode(expected) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        let digest = derive(password, salt, iterations);
        digest[..].ct_eq(&expected[..]).into()
    }

    /// Whether a stored hash was produced with different settings
    pub fn needs_rehash(&self, encoded: &str) -> bool {
        encoded
            .split('$')
            .nth(1)
            .and_then(|i| i.parse::<u32>().ok())
            .map_or(true, |i| i != self.iterations)
    }
}

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; DIGEST_LENGTH] {
    let mut digest = [0u8; DIGEST_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut digest);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies() {
        let hasher = PasswordHasher::new(1000);
        let encoded = hasher.hash("testpass123");

        assert!(encoded.starts_with("pbkdf2_sha256$1000$"));
        assert!(hasher.verify("testpass123", &encoded));
        assert!(!hasher.verify("wrongpass", &encoded));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher::new(1000);
        assert_ne!(hasher.hash("same"), hasher.hash("same"));
    }

    #[test]
    fn test_known_vector() {
        // RFC 7914 section 11 PBKDF2-HMAC-SHA256 vector, 1 iteration
        let hasher = PasswordHasher::new(1);
        let encoded = hasher.hash_with_salt("passwd", "salt");
        let digest = STANDARD
            .decode(encoded.rsplit('$').next().unwrap())
            .unwrap();
        assert_eq!(
            hex::encode(&digest[..16]),
            "55ac046e56e3089fec1691c22544b605"
        );
    }

    #[test]
    fn test_verify_uses_stored_iterations() {
        let old = PasswordHasher::new(500);
        let encoded = old.hash("secret");
        let current = PasswordHasher::new(1000);

        assert!(current.verify("secret", &encoded));
        assert!(current.needs_rehash(&encoded));
        assert!(!old.needs_rehash(&encoded));
    }

    #[test]
    fn test_malformed_hashes_rejected() {
        let hasher = PasswordHasher::new(1000);
        assert!(!hasher.verify("x", ""));
        assert!(!hasher.verify("x", "md5$1$salt$abc"));
        assert!(!hasher.verify("x", "pbkdf2_sha256$0$salt$abc"));
        assert!(!hasher.verify("x", "pbkdf2_sha256$10$salt$not base64!"));
    }
}
