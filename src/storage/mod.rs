//! Storage for credential records

pub mod memory;
pub mod traits;

pub use memory::MemoryCredentialRepository;
pub use traits::CredentialRepository;
