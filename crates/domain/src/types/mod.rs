//! Domain types and models
//!
//! - [`chat`]: role-tagged messages plus the request and response envelopes
//! - [`credential`]: bearer credentials and their diagnostic view
//! - [`wire`]: JSON bodies exchanged with the token endpoint and error
//!   payloads

pub mod chat;
pub mod credential;
pub mod wire;

pub use chat::{ChatMessage, RequestEnvelope, ResponseEnvelope, Role, Usage};
pub use credential::{Credential, CredentialInfo};
pub use wire::{ErrorBody, TokenGrant, TokenRequest};
