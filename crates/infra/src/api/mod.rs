//! HTTP adapters for the token and chat endpoints
//!
//! Both adapters implement ports from `parley-core` over [`HttpClient`]
//! and send each request once. Status classification, retries and 401
//! recovery happen in core.
//!
//! [`HttpClient`]: crate::http::HttpClient

pub mod chat;
pub mod endpoint;
pub mod tokens;

pub use chat::HttpChatTransport;
pub use endpoint::endpoint_url;
pub use tokens::HttpTokenIssuer;
