//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestFailureReason {
    /// The server answered with a non-success status.
    Status,
    /// The per-attempt deadline elapsed.
    Timeout,
    /// The connection could not be established or was lost.
    Network,
}

crate::impl_domain_label_conversions!(RequestFailureReason {
    Status => "status",
    Timeout => "timeout",
    Network => "network",
});

/// Main error type for Parley
///
/// `Clone` so that the outcome of one credential refresh can be handed to
/// every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParleyError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Credential error: {message}")]
    Credential { message: String },

    #[error("Request error: {message}")]
    Request { message: String, status: Option<u16>, reason: RequestFailureReason },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Request cancelled")]
    Cancelled,
}

impl ParleyError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Non-success HTTP status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
            status: Some(status),
            reason: RequestFailureReason::Status,
        }
    }

    /// Per-attempt deadline elapsed.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
            status: None,
            reason: RequestFailureReason::Timeout,
        }
    }

    /// Connection-level failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
            status: None,
            reason: RequestFailureReason::Network,
        }
    }

    /// Stable label for structured log fields.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Credential { .. } => "credential",
            Self::Request { .. } => "request",
            Self::Config { .. } => "config",
            Self::Cancelled => "cancelled",
        }
    }

    /// `true` when the caller abandoned the operation. Not a failure.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP status carried by a request failure, if any.
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => *status,
            _ => None,
        }
    }

    /// Failure reason carried by a request failure, if any.
    pub const fn request_reason(&self) -> Option<RequestFailureReason> {
        match self {
            Self::Request { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Result type alias for Parley operations
pub type Result<T> = std::result::Result<T, ParleyError>;
