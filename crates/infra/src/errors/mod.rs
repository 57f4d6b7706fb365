//! Infrastructure errors and their conversions into the domain and port
//! error types.

pub mod conversions;

pub use conversions::InfraError;
