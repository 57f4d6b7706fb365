//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, DEFAULT_SAFETY_BUFFER_MS,
    DEFAULT_SUBJECT, DEFAULT_TIMEOUT_MS,
};
use crate::errors::{ParleyError, Result};

/// Configuration shared by the credential manager and the chat client.
///
/// Durations are written in milliseconds in files (`timeout_ms`,
/// `retry_delay_ms`, `safety_buffer_ms`). Missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base endpoint address, e.g. `http://localhost:3000`
    pub base_url: String,
    /// Identity sent to the token endpoint
    pub subject: String,
    /// Deadline applied to each chat attempt
    #[serde(rename = "timeout_ms", with = "duration_ms")]
    pub request_timeout: Duration,
    /// Attempts per chat call and per credential refresh
    pub max_attempts: u32,
    /// Base delay of the exponential backoff
    #[serde(rename = "retry_delay_ms", with = "duration_ms")]
    pub retry_delay: Duration,
    /// Lead time before expiry at which a credential stops being used
    #[serde(rename = "safety_buffer_ms", with = "duration_ms")]
    pub safety_buffer: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            safety_buffer: Duration::from_millis(DEFAULT_SAFETY_BUFFER_MS),
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    #[must_use]
    pub const fn with_safety_buffer(mut self, buffer: Duration) -> Self {
        self.safety_buffer = buffer;
        self
    }

    /// `safety_buffer` as a signed chrono duration, saturating on overflow.
    pub fn safety_buffer_delta(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.safety_buffer).unwrap_or(chrono::Duration::MAX)
    }

    /// Reject configurations the client cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ParleyError::Config`] for an empty base URL, a blank subject,
    /// zero attempts or a zero request timeout.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ParleyError::config("base_url must not be empty"));
        }
        if self.subject.trim().is_empty() {
            return Err(ParleyError::config("subject must not be empty"));
        }
        if self.max_attempts == 0 {
            return Err(ParleyError::config("max_attempts must be at least 1"));
        }
        if self.request_timeout.is_zero() {
            return Err(ParleyError::config("timeout_ms must be greater than zero"));
        }
        Ok(())
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
