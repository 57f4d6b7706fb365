//! Port interface for the chat endpoint

use async_trait::async_trait;
use parley_domain::{Credential, ErrorBody, RequestEnvelope};
use thiserror::Error;

/// Raw outcome of one chat exchange that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    /// Canonical reason phrase for `status`, empty if unknown
    pub status_text: String,
    pub body: String,
}

impl TransportReply {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self { status, status_text: status_text.into(), body: body.into() }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Server-provided `{"message"}` if present, otherwise the status text.
    pub fn error_message(&self) -> String {
        ErrorBody::message_from(&self.body).unwrap_or_else(|| {
            if self.status_text.is_empty() {
                format!("HTTP {}", self.status)
            } else {
                self.status_text.clone()
            }
        })
    }
}

/// Failure before any status was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("transport timed out: {0}")]
    Timeout(String),

    /// The request could not be built; retrying will not help.
    #[error("transport misconfigured: {0}")]
    Config(String),
}

/// Trait for delivering a chat envelope to the server
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// POST `envelope` authorized with `credential`.
    async fn post_chat(
        &self,
        credential: &Credential,
        envelope: &RequestEnvelope,
    ) -> Result<TransportReply, TransportError>;
}
