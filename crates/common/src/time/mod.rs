//! Time utilities and abstractions
//!
//! - **[`expiry`]**: credential lifetime expressions (`"900"`, `"15m"`, RFC
//!   3339 instants) resolved against a reference instant
//! - **[`clock`]**: wall-clock abstraction with a controllable mock for tests
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "foundation")]
//! # {
//! use chrono::{Duration, TimeZone, Utc};
//!
//! use parley_common::time::parse_expiry;
//!
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! assert_eq!(parse_expiry("15m", now).unwrap(), now + Duration::minutes(15));
//! # }
//! ```

#[cfg(feature = "runtime")]
pub mod clock;
pub mod expiry;

#[cfg(feature = "runtime")]
pub use clock::{Clock, MockClock, SystemClock};
pub use expiry::{parse_expiry, ExpiryParseError};
