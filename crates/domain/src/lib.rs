//! # Parley Domain
//!
//! Domain types and models for Parley.
//!
//! This crate contains:
//! - Chat envelopes and credential types
//! - The error taxonomy and Result definition
//! - Client configuration
//! - Protocol constants
//!
//! ## Architecture
//! - No dependencies on other Parley crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
