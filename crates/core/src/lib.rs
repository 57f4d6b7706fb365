//! # Parley Core
//!
//! Client logic with no HTTP code of its own.
//!
//! This crate contains:
//! - Port interfaces for token issuance and chat transport (traits)
//! - The credential manager with deduplicated refresh
//! - The resilient chat client
//! - The conversation accumulator
//!
//! ## Architecture Principles
//! - Only depends on `parley-common` and `parley-domain`
//! - No HTTP or platform code
//! - All external effects via traits
//! - Testable against in-memory port doubles

pub mod client;
pub mod conversation;
pub mod credentials;

// Re-export specific items to avoid ambiguity
pub use client::ports::{ChatTransport, TransportError, TransportReply};
pub use client::ChatClient;
pub use conversation::{Conversation, SendFailure};
pub use credentials::ports::{IssueError, TokenIssuer};
pub use credentials::CredentialManager;
