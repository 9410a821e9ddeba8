//! Per-request access guard
//!
//! Every protected call passes its `Authorization` header value through
//! [`AccessGuard::authorize`]. The outcome is binary to the outside world:
//! a verified [`Claims`] or a [`Rejection`] that always renders as
//! "Unauthorized". The specific reason is only logged.

use std::fmt;
use std::sync::Arc;

use crate::auth::token::{unix_now, Claims, TokenCodec, VerificationFailure};
use crate::constants::BEARER_SCHEME;
use crate::error::GymGuardError;
use crate::security_logger::{log_security_event, SecurityEvent};

/// Internal reason behind a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingToken,
    Malformed,
    BadSignature,
    Expired,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingToken => "missing_token",
            RejectReason::Malformed => "malformed",
            RejectReason::BadSignature => "bad_signature",
            RejectReason::Expired => "expired",
        }
    }
}

impl From<VerificationFailure> for RejectReason {
    fn from(failure: VerificationFailure) -> Self {
        match failure {
            VerificationFailure::Malformed => RejectReason::Malformed,
            VerificationFailure::BadSignature => RejectReason::BadSignature,
            VerificationFailure::Expired => RejectReason::Expired,
        }
    }
}

/// A request that must not proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    reason: RejectReason,
}

impl Rejection {
    /// For logging and tests only; never put this in a response
    pub fn reason(&self) -> RejectReason {
        self.reason
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unauthorized")
    }
}

impl std::error::Error for Rejection {}

impl From<Rejection> for GymGuardError {
    fn from(_: Rejection) -> Self {
        GymGuardError::Unauthorized
    }
}

/// Extracts the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Gate in front of every protected route
#[derive(Debug, Clone)]
pub struct AccessGuard {
    codec: Arc<TokenCodec>,
}

impl AccessGuard {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Authorizes a request given its raw `Authorization` header value
    pub fn authorize(&self, auth_header: Option<&str>) -> Result<Claims, Rejection> {
        self.authorize_at(auth_header, unix_now())
    }

    /// Same as [`authorize`](Self::authorize) with an explicit clock reading
    pub fn authorize_at(&self, auth_header: Option<&str>, now: u64) -> Result<Claims, Rejection> {
        let token = match auth_header.and_then(extract_bearer_token) {
            Some(token) => token,
            None => return Err(self.reject(RejectReason::MissingToken)),
        };

        self.codec
            .verify_at(token, now)
            .map_err(|failure| self.reject(failure.into()))
    }

    fn reject(&self, reason: RejectReason) -> Rejection {
        log_security_event(&SecurityEvent::TokenValidationFailed {
            reason: reason.as_str(),
        });
        Rejection { reason }
    }
}
