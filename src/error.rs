use std::error::Error;
use std::fmt;

use crate::auth::token::VerificationFailure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GymGuardError {
    // Configuration errors
    ConfigError(String),

    // Credential errors
    HashingError(String),
    CredentialMismatch,

    // Account errors
    AccountExists,
    ValidationError(String),

    // Storage errors
    StorageError(String),

    // Token errors
    Token(VerificationFailure),
    Unauthorized,

    // System errors
    SystemError(String),
}

impl fmt::Display for GymGuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::HashingError(msg) => write!(f, "Password hashing error: {}", msg),
            Self::CredentialMismatch => write!(f, "Invalid credentials"),
            Self::AccountExists => write!(f, "An account with this email already exists"),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::Token(failure) => write!(f, "Token verification failed: {}", failure),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::SystemError(msg) => write!(f, "System error: {}", msg),
        }
    }
}

impl Error for GymGuardError {}

impl From<VerificationFailure> for GymGuardError {
    fn from(failure: VerificationFailure) -> Self {
        GymGuardError::Token(failure)
    }
}

// Generic result type for the crate
pub type Result<T> = std::result::Result<T, GymGuardError>;
