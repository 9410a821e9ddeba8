//! Request handlers for the HTTP endpoints

pub mod auth;
pub mod routes;

pub use auth::{AccountService, LoginOutcome};
pub use routes::{routes, with_identity, AppState};
