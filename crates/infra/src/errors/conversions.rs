//! Conversions from external infrastructure errors into domain errors.

use parley_core::{IssueError, TransportError};
use parley_domain::ParleyError;
use reqwest::Error as HttpError;
use thiserror::Error;

/// Failure raised by the HTTP adapters or the configuration loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfraError {
    #[error("HTTP request timed out")]
    Timeout,

    #[error("HTTP connection failure: {0}")]
    Connect(String),

    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    Config(String),
}

impl InfraError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → InfraError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }

        #[cfg(not(target_arch = "wasm32"))]
        if err.is_connect() {
            return Self::Connect(err.to_string());
        }

        if err.is_builder() {
            return Self::Config(format!("invalid HTTP request: {err}"));
        }

        Self::Transport(err.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* InfraError → domain and port errors */
/* -------------------------------------------------------------------------- */

impl From<InfraError> for ParleyError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Timeout => Self::timeout(err.to_string()),
            InfraError::Connect(_) | InfraError::Transport(_) => Self::network(err.to_string()),
            InfraError::Config(message) => Self::config(message),
        }
    }
}

impl From<InfraError> for TransportError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Timeout => Self::Timeout(err.to_string()),
            InfraError::Connect(_) | InfraError::Transport(_) => Self::Network(err.to_string()),
            InfraError::Config(message) => Self::Config(message),
        }
    }
}

// The issuer port has no configuration variant; endpoint URLs are checked
// when the adapter is built, so anything left here is a transport failure.
impl From<InfraError> for IssueError {
    fn from(err: InfraError) -> Self {
        Self::Network(err.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
