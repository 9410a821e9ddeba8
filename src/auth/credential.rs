//! Password storage
//!
//! New digests are Argon2id PHC strings (`$argon2id$v=19$m=...`) with a
//! random per-record salt. Digests written by the previous backend were an
//! unsalted SHA-256 hex string; those still verify so existing accounts can
//! log in, and `needs_rehash` flags them for replacement.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version, ARGON2ID_IDENT};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::constants::{
    DEFAULT_ARGON2_ITERATIONS, DEFAULT_ARGON2_MEMORY_KIB, DEFAULT_ARGON2_PARALLELISM,
};
use crate::error::{GymGuardError, Result};
use crate::security::timing::constant_time_eq;

const LEGACY_DIGEST_LEN: usize = 64;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_ARGON2_MEMORY_KIB,
            iterations: DEFAULT_ARGON2_ITERATIONS,
            parallelism: DEFAULT_ARGON2_PARALLELISM,
        }
    }
}

/// Format of a stored digest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    Argon2,
    LegacySha256,
    Unknown,
}

impl DigestKind {
    pub fn detect(digest: &str) -> Self {
        if digest.starts_with("$argon2") {
            DigestKind::Argon2
        } else if digest.len() == LEGACY_DIGEST_LEN
            && digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            DigestKind::LegacySha256
        } else {
            DigestKind::Unknown
        }
    }
}

/// One-way password transform and verification
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    cost: HashingCost,
}

impl PasswordHasher {
    /// Creates a hasher, rejecting cost parameters Argon2 cannot run with
    pub fn new(cost: HashingCost) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| {
                GymGuardError::ConfigError(format!("Invalid Argon2 parameters: {}", e))
            })?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            cost,
        })
    }

    pub fn cost(&self) -> HashingCost {
        self.cost
    }

    /// Hashes a plaintext password into a PHC string with a fresh salt
    pub fn hash(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| GymGuardError::HashingError(format!("Failed to hash password: {}", e)))
    }

    /// Checks a candidate password against a stored digest.
    ///
    /// Unparseable digests never match.
    pub fn verify(&self, candidate: &str, digest: &str) -> bool {
        match DigestKind::detect(digest) {
            DigestKind::Argon2 => match PasswordHash::new(digest) {
                Ok(parsed) => self
                    .argon2
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok(),
                Err(e) => {
                    log::debug!("Stored password digest could not be parsed: {}", e);
                    false
                }
            },
            DigestKind::LegacySha256 => constant_time_eq(&legacy_sha256_hex(candidate), digest),
            DigestKind::Unknown => {
                log::debug!("Stored password digest has an unrecognised format");
                false
            }
        }
    }

    /// Whether a stored digest should be replaced by a fresh `hash` output
    pub fn needs_rehash(&self, digest: &str) -> bool {
        if DigestKind::detect(digest) != DigestKind::Argon2 {
            return true;
        }

        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(_) => return true,
        };

        if parsed.algorithm != ARGON2ID_IDENT {
            return true;
        }

        match Params::try_from(&parsed) {
            Ok(params) => {
                params.m_cost() != self.cost.memory_kib
                    || params.t_cost() != self.cost.iterations
                    || params.p_cost() != self.cost.parallelism
            }
            Err(_) => true,
        }
    }
}

/// Digest format used by the previous backend: lowercase hex SHA-256, no salt
fn legacy_sha256_hex(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::new(HashingCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = cheap_hasher();
        let first = hasher.hash("correct horse").unwrap();
        let second = hasher.hash("correct horse").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(hasher.verify("correct horse", &first));
        assert!(hasher.verify("correct horse", &second));
    }

    #[test]
    fn test_digest_never_contains_plaintext() {
        let hasher = cheap_hasher();
        let digest = hasher.hash("plaintext-marker").unwrap();
        assert!(!digest.contains("plaintext-marker"));
    }

    #[test]
    fn test_legacy_digest_verifies() {
        let hasher = cheap_hasher();
        // sha256("1234")
        let legacy = "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4";

        assert_eq!(DigestKind::detect(legacy), DigestKind::LegacySha256);
        assert!(hasher.verify("1234", legacy));
        assert!(!hasher.verify("12345", legacy));
        assert!(hasher.needs_rehash(legacy));
    }

    #[test]
    fn test_unknown_digest_never_matches() {
        let hasher = cheap_hasher();
        assert!(!hasher.verify("", ""));
        assert!(!hasher.verify("1234", "1234"));
        assert!(!hasher.verify("x", "$argon2id$garbage"));
        assert_eq!(DigestKind::detect("ABCDEF"), DigestKind::Unknown);
    }

    #[test]
    fn test_needs_rehash_tracks_cost() {
        let hasher = cheap_hasher();
        let digest = hasher.hash("pw-under-test").unwrap();
        assert!(!hasher.needs_rehash(&digest));

        let stronger = PasswordHasher::new(HashingCost {
            memory_kib: 2048,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        assert!(stronger.needs_rehash(&digest));
        // Old-cost digests still verify under new settings
        assert!(stronger.verify("pw-under-test", &digest));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let result = PasswordHasher::new(HashingCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(GymGuardError::ConfigError(_))));
    }
}
