//! Security-focused logging of authentication events
//!
//! Internal distinctions that are never shown to callers (why a token was
//! rejected, whether an email exists) are recorded here. Events carry no
//! credential material: no passwords, digests, keys or raw tokens.

/// Log target for every security event
pub const SECURITY_TARGET: &str = "security";

/// Types of security events to track
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityEvent {
    // Authentication events
    AuthenticationFailed { identity: String, reason: &'static str },
    AuthenticationSuccess { identity: String },
    TokenValidationFailed { reason: &'static str },

    // Account events
    AccountRegistered { identity: String },
    CredentialUpgraded { identity: String },

    // System security
    ConfigurationError { component: String, error: String },
}

impl SecurityEvent {
    /// Stable key used to group events in log pipelines
    pub fn kind(&self) -> &'static str {
        match self {
            SecurityEvent::AuthenticationFailed { .. } => "auth_failed",
            SecurityEvent::AuthenticationSuccess { .. } => "auth_success",
            SecurityEvent::TokenValidationFailed { .. } => "token_validation_failed",
            SecurityEvent::AccountRegistered { .. } => "account_registered",
            SecurityEvent::CredentialUpgraded { .. } => "credential_upgraded",
            SecurityEvent::ConfigurationError { .. } => "config_error",
        }
    }
}

/// Emit a security event through the `log` facade
pub fn log_security_event(event: &SecurityEvent) {
    let kind = event.kind();
    match event {
        SecurityEvent::AuthenticationFailed { identity, reason } => {
            log::warn!(target: SECURITY_TARGET, "SECURITY[{}]: Authentication failed - Identity: {}, Reason: {}", kind, identity, reason);
        }
        SecurityEvent::AuthenticationSuccess { identity } => {
            log::info!(target: SECURITY_TARGET, "SECURITY[{}]: Authentication success - Identity: {}", kind, identity);
        }
        SecurityEvent::TokenValidationFailed { reason } => {
            log::debug!(target: SECURITY_TARGET, "SECURITY[{}]: Token rejected - Reason: {}", kind, reason);
        }
        SecurityEvent::AccountRegistered { identity } => {
            log::info!(target: SECURITY_TARGET, "SECURITY[{}]: Account registered - Identity: {}", kind, identity);
        }
        SecurityEvent::CredentialUpgraded { identity } => {
            log::info!(target: SECURITY_TARGET, "SECURITY[{}]: Stored password digest upgraded - Identity: {}", kind, identity);
        }
        SecurityEvent::ConfigurationError { component, error } => {
            log::error!(target: SECURITY_TARGET, "SECURITY[{}]: Configuration error - Component: {}, Error: {}", kind, component, error);
        }
    }
}
