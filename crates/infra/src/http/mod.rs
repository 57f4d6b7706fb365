//! HTTP client shared by the endpoint adapters.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
