//! Resilient chat client and its transport port.

pub mod ports;
pub mod service;

pub use ports::*;
pub use service::ChatClient;
