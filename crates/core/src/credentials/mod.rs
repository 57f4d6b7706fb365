//! Credential lifecycle: issuance port and the deduplicating manager.

pub mod manager;
pub mod ports;

pub use manager::CredentialManager;
pub use ports::*;
