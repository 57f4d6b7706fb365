//! # Parley Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-based HTTP client
//! - Adapters for the token and chat endpoints
//! - Configuration loading from environment variables and files
//! - Tracing subscriber setup
//! - Session wiring and the one-shot `ask` call
//!
//! ## Architecture
//! - Implements traits defined in `parley-core`
//! - Depends on `parley-domain` and `parley-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod session;

// Re-export commonly used items
pub use api::{HttpChatTransport, HttpTokenIssuer};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_tracing, LogFormat};
pub use session::{ask, ChatSession};
