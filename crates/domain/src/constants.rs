//! Protocol and configuration constants
//!
//! Centralized location for all domain-level constants used throughout the
//! client.

// Endpoint layout
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const TOKENS_PATH: &str = "/api/tokens";
pub const CHAT_PATH: &str = "/api/chat";

// Request envelope limits
pub const MAX_MESSAGES: usize = 50;

// Client defaults
pub const DEFAULT_SUBJECT: &str = "dev-user";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_SAFETY_BUFFER_MS: u64 = 60_000;
