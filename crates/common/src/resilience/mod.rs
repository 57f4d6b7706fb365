//! Resilience helpers for retrying transient failures
//!
//! - **[`backoff`]**: exponential delay schedule shared by the credential
//!   refresher and the request client

pub mod backoff;

pub use backoff::ExponentialBackoff;
