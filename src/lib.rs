//! Gym Guard - the login wall of the gym administration service
//!
//! This library provides password storage, self-contained signed session
//! tokens and the per-request access guard that every protected route
//! runs before its own logic.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod security;
pub mod security_logger;
pub mod storage;

// Re-export main components
pub use auth::{AccessGuard, Claims, PasswordHasher, SigningKey, TokenCodec};
pub use config::ServerConfig;
pub use error::{GymGuardError, Result};
