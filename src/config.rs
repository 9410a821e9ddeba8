//! Server configuration module
//! Loads process-wide settings once at startup; nothing here is hot-reloaded.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::credential::HashingCost;
use crate::auth::token::{MacAlgorithm, SigningKey};
use crate::constants::{
    DEFAULT_ALLOWED_ORIGINS, DEFAULT_ARGON2_ITERATIONS, DEFAULT_ARGON2_MEMORY_KIB,
    DEFAULT_ARGON2_PARALLELISM, DEFAULT_HOST, DEFAULT_MIN_AUTH_MILLIS, DEFAULT_PORT,
    DEFAULT_TOKEN_LIFETIME_SECS, MIN_SECRET_LEN,
};
use crate::error::{GymGuardError, Result};

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Key for token signing/validation
    pub token_secret: SigningKey,
    /// Lifetime stamped into every issued token
    pub token_lifetime: Duration,
    pub mac_algorithm: MacAlgorithm,
    /// Argon2id cost for new password digests
    pub hashing_cost: HashingCost,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
    /// Minimum duration of a login attempt, success or not
    pub min_auth_duration: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        panic!("ServerConfig::default() is not allowed for security reasons. Use ServerConfig::from_env() instead.");
    }
}

impl ServerConfig {
    /// Create a test configuration - DANGEROUS: Only for testing!
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            token_secret: SigningKey::new("unit-test-token-key-never-use-in-production-0001")
                .unwrap(),
            token_lifetime: Duration::from_secs(DEFAULT_TOKEN_LIFETIME_SECS),
            mac_algorithm: MacAlgorithm::HmacSha256,
            hashing_cost: HashingCost {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGINS.to_string()],
            min_auth_duration: Duration::ZERO,
        }
    }

    /// Validate that a secret meets security requirements
    fn validate_secret(secret: &str) -> Result<()> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(GymGuardError::ConfigError(format!(
                "Token secret must be at least {} characters long",
                MIN_SECRET_LEN
            )));
        }

        // Known placeholder values, including the one the old backend shipped with
        let insecure_patterns = [
            "gym_super_secret_key",
            "your-secret-key",
            "change-this",
            "changeme",
            "example",
            "default",
            "secret",
            "password",
            "12345",
        ];

        let lowered = secret.to_lowercase();
        for pattern in &insecure_patterns {
            if lowered.contains(pattern) {
                return Err(GymGuardError::ConfigError(format!(
                    "Token secret contains insecure pattern '{}'. Please use a secure random secret generated with: openssl rand -base64 32",
                    pattern
                )));
            }
        }

        if secret.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(GymGuardError::ConfigError(
                "Token secret should contain mixed characters (letters, numbers, symbols) for security".to_string(),
            ));
        }

        Ok(())
    }

    fn parse_origins(raw: &str) -> Result<Vec<String>> {
        let mut origins = Vec::new();
        for origin in raw.split(',').map(str::trim).filter(|o| !o.is_empty()) {
            let url = url::Url::parse(origin).map_err(|e| {
                GymGuardError::ConfigError(format!("Invalid allowed origin '{}': {}", origin, e))
            })?;
            if !matches!(url.scheme(), "http" | "https")
                || url.host_str().is_none()
                || url.path() != "/"
                || url.query().is_some()
            {
                return Err(GymGuardError::ConfigError(format!(
                    "Allowed origin '{}' must be an http(s) origin",
                    origin
                )));
            }
            origins.push(origin.trim_end_matches('/').to_string());
        }
        Ok(origins)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("GYM_GUARD_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, "GYM_GUARD_PORT", DEFAULT_PORT)?;

        let secret = lookup("GYM_GUARD_TOKEN_SECRET")
            .or_else(|| lookup("TOKEN_SECRET"))
            .ok_or_else(|| {
                GymGuardError::ConfigError(
                    "GYM_GUARD_TOKEN_SECRET environment variable is required for security. \
                     Generate one with: openssl rand -base64 32"
                        .to_string(),
                )
            })?;
        Self::validate_secret(&secret)?;
        let token_secret = SigningKey::new(secret)?;

        let lifetime_secs = parse_or(
            &lookup,
            "GYM_GUARD_TOKEN_LIFETIME_SECS",
            DEFAULT_TOKEN_LIFETIME_SECS,
        )?;
        if lifetime_secs == 0 {
            return Err(GymGuardError::ConfigError(
                "GYM_GUARD_TOKEN_LIFETIME_SECS must be greater than zero".to_string(),
            ));
        }

        let mac_algorithm = parse_or(&lookup, "GYM_GUARD_MAC_ALGORITHM", MacAlgorithm::default())?;

        let hashing_cost = HashingCost {
            memory_kib: parse_or(&lookup, "GYM_GUARD_ARGON2_MEMORY_KIB", DEFAULT_ARGON2_MEMORY_KIB)?,
            iterations: parse_or(&lookup, "GYM_GUARD_ARGON2_ITERATIONS", DEFAULT_ARGON2_ITERATIONS)?,
            parallelism: parse_or(
                &lookup,
                "GYM_GUARD_ARGON2_PARALLELISM",
                DEFAULT_ARGON2_PARALLELISM,
            )?,
        };

        let allowed_origins = Self::parse_origins(
            &lookup("GYM_GUARD_ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
        )?;

        let min_auth_millis = parse_or(&lookup, "GYM_GUARD_MIN_AUTH_MILLIS", DEFAULT_MIN_AUTH_MILLIS)?;

        Ok(Self {
            host,
            port,
            token_secret,
            token_lifetime: Duration::from_secs(lifetime_secs),
            mac_algorithm,
            hashing_cost,
            allowed_origins,
            min_auth_duration: Duration::from_millis(min_auth_millis),
        })
    }
}

/// Parse an optional variable, failing on values that are present but invalid
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| GymGuardError::ConfigError(format!("Invalid value for {}: '{}'", key, raw))),
        None => Ok(default),
    }
}
