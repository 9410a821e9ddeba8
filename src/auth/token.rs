//! Signed session tokens
//!
//! A token is `base64url(claim_json) "." base64url(mac)`, unpadded. The MAC
//! is computed with the process signing key over the encoded claim segment
//! exactly as it appears in the token, so validity is decided by
//! recomputation alone and no session table exists on the server.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::hmac;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::constants::{MAX_TOKEN_LEN, MIN_SECRET_LEN};
use crate::error::{GymGuardError, Result};

/// Current UNIX time in seconds
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Why a token was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    /// Structure, encoding or claim layout is wrong
    Malformed,
    /// MAC does not match the claim under the current key
    BadSignature,
    /// Claim is authentic but its lifetime has elapsed
    Expired,
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed token"),
            Self::BadSignature => write!(f, "bad signature"),
            Self::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for VerificationFailure {}

/// Identity payload sealed into a token.
///
/// Field order is the canonical encoding; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Account identifier (normalised email)
    pub identity: String,
    /// Issued at (UNIX seconds)
    pub issued_at: u64,
    /// Expiration time (UNIX seconds)
    pub expires_at: u64,
}

impl Claims {
    pub fn new(identity: impl Into<String>, issued_at: u64, lifetime: Duration) -> Self {
        Self {
            identity: identity.into(),
            issued_at,
            expires_at: issued_at.saturating_add(lifetime.as_secs()),
        }
    }

    /// A token is still valid during the second it expires
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }

    fn canonical_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| GymGuardError::SystemError(format!("Failed to encode claims: {}", e)))
    }
}

/// MAC algorithm used for every token of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MacAlgorithm {
    #[default]
    HmacSha256,
    HmacSha512,
}

impl MacAlgorithm {
    fn ring_algorithm(self) -> hmac::Algorithm {
        match self {
            MacAlgorithm::HmacSha256 => hmac::HMAC_SHA256,
            MacAlgorithm::HmacSha512 => hmac::HMAC_SHA512,
        }
    }
}

impl FromStr for MacAlgorithm {
    type Err = GymGuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hmac-sha256" | "hs256" => Ok(MacAlgorithm::HmacSha256),
            "hmac-sha512" | "hs512" => Ok(MacAlgorithm::HmacSha512),
            other => Err(GymGuardError::ConfigError(format!(
                "Unsupported MAC algorithm '{}', expected hmac-sha256 or hmac-sha512",
                other
            ))),
        }
    }
}

impl fmt::Display for MacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacAlgorithm::HmacSha256 => write!(f, "hmac-sha256"),
            MacAlgorithm::HmacSha512 => write!(f, "hmac-sha512"),
        }
    }
}

/// Process-wide symmetric signing key
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Fails for keys shorter than `MIN_SECRET_LEN` bytes
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(GymGuardError::ConfigError(format!(
                "Token signing secret must be at least {} bytes long",
                MIN_SECRET_LEN
            )));
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey([REDACTED; {} bytes])", self.0.len())
    }
}

/// A freshly issued token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues and verifies tokens under a single key
#[derive(Clone)]
pub struct TokenCodec {
    key: hmac::Key,
    algorithm: MacAlgorithm,
    lifetime: Duration,
}

impl TokenCodec {
    pub fn new(key: &SigningKey, algorithm: MacAlgorithm, lifetime: Duration) -> Result<Self> {
        if lifetime.as_secs() == 0 {
            return Err(GymGuardError::ConfigError(
                "Token lifetime must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            key: hmac::Key::new(algorithm.ring_algorithm(), key.as_bytes()),
            algorithm,
            lifetime,
        })
    }

    pub fn algorithm(&self) -> MacAlgorithm {
        self.algorithm
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issues a token for `identity` stamped with the current time
    pub fn issue(&self, identity: &str) -> Result<IssuedToken> {
        self.issue_at(identity, unix_now())
    }

    /// Issues a token for `identity` as if the current time were `now`
    pub fn issue_at(&self, identity: &str, now: u64) -> Result<IssuedToken> {
        if identity.is_empty() {
            return Err(GymGuardError::ValidationError(
                "Cannot issue a token for an empty identity".to_string(),
            ));
        }

        let claims = Claims::new(identity, now, self.lifetime);
        let token = self.seal(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Encodes and signs explicit claims
    pub fn seal(&self, claims: &Claims) -> Result<String> {
        let payload_part = URL_SAFE_NO_PAD.encode(claims.canonical_bytes()?);
        let tag = hmac::sign(&self.key, payload_part.as_bytes());

        Ok(format!("{}.{}", payload_part, URL_SAFE_NO_PAD.encode(tag.as_ref())))
    }

    /// Verifies a token against the current time
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, VerificationFailure> {
        self.verify_at(token, unix_now())
    }

    /// Verifies a token as if the current time were `now`
    pub fn verify_at(
        &self,
        token: &str,
        now: u64,
    ) -> std::result::Result<Claims, VerificationFailure> {
        if token.len() > MAX_TOKEN_LEN || token.chars().any(|c| c.is_control()) {
            return Err(VerificationFailure::Malformed);
        }

        let (payload_part, mac_part) = token
            .split_once('.')
            .ok_or(VerificationFailure::Malformed)?;
        if payload_part.is_empty() || mac_part.is_empty() {
            return Err(VerificationFailure::Malformed);
        }

        let mac = URL_SAFE_NO_PAD
            .decode(mac_part)
            .map_err(|_| VerificationFailure::Malformed)?;

        // Constant-time comparison inside ring. The claim segment is
        // authenticated before it is decoded.
        hmac::verify(&self.key, payload_part.as_bytes(), &mac)
            .map_err(|_| VerificationFailure::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|_| VerificationFailure::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| VerificationFailure::Malformed)?;

        // Authentic but non-canonical payloads are not produced by `seal`
        match claims.canonical_bytes() {
            Ok(bytes) if bytes == payload => {}
            _ => return Err(VerificationFailure::Malformed),
        }

        if claims.is_expired_at(now) {
            return Err(VerificationFailure::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
