//! Port interface for token issuance
//!
//! The credential manager depends on this trait only; the HTTP adapter lives
//! in `parley-infra`.

use async_trait::async_trait;
use parley_domain::TokenGrant;
use thiserror::Error;

/// Failure reported by a [`TokenIssuer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueError {
    /// The endpoint refused the subject (HTTP 401).
    #[error("token request unauthorized: {0}")]
    Unauthorized(String),

    /// The endpoint answered 2xx with a body that is not a token grant.
    #[error("malformed token response: {0}")]
    Malformed(String),

    /// Any other non-success status.
    #[error("token endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection failure or transport-level timeout.
    #[error("token endpoint unreachable: {0}")]
    Network(String),
}

impl IssueError {
    /// Terminal failures are never retried.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Malformed(_))
    }
}

/// Trait for obtaining fresh bearer tokens
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Request a token for `subject`.
    async fn issue(&self, subject: &str) -> Result<TokenGrant, IssueError>;
}
