//! Observability bootstrap
//!
//! The library crates only emit `tracing` events; binaries and examples call
//! [`init_tracing`] once to install a subscriber.

pub mod logging;

pub use logging::{init_tracing, LogFormat};
