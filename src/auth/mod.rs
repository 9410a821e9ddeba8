//! Authentication core: password storage, signed tokens and the access guard

pub mod credential;
pub mod guard;
pub mod token;
pub mod user;

// Re-export main components
pub use credential::{DigestKind, HashingCost, PasswordHasher};
pub use guard::{extract_bearer_token, AccessGuard, RejectReason, Rejection};
pub use token::{Claims, IssuedToken, MacAlgorithm, SigningKey, TokenCodec, VerificationFailure};
pub use user::{normalize_email, Account, CredentialRecord};
