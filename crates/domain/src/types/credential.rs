//! Bearer credentials

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ParleyError, Result};

/// A bearer token together with its expiry and kind label.
///
/// Immutable once constructed. `Debug` output never includes the token
/// value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: DateTime<Utc>,
    kind: String,
}

impl Credential {
    /// Build a credential from an issued triple.
    ///
    /// # Errors
    ///
    /// Returns [`ParleyError::Credential`] if the token or kind is blank.
    pub fn new(
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
        kind: impl Into<String>,
    ) -> Result<Self> {
        let token = token.into();
        let kind = kind.into();
        if token.trim().is_empty() {
            return Err(ParleyError::credential("issued token is empty"));
        }
        if kind.trim().is_empty() {
            return Err(ParleyError::credential("issued token type is empty"));
        }
        Ok(Self { token, expires_at, kind })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// `true` while `now` is earlier than the expiry minus `safety_buffer`.
    pub fn is_usable_at(&self, now: DateTime<Utc>, safety_buffer: Duration) -> bool {
        match self.expires_at.checked_sub_signed(safety_buffer) {
            Some(refresh_at) => now < refresh_at,
            None => false,
        }
    }

    /// Time left before the true expiry (negative once expired).
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Diagnostic view of the held credential. Never carries the token value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CredentialInfo {
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl CredentialInfo {
    pub fn absent() -> Self {
        Self::default()
    }
}

impl From<&Credential> for CredentialInfo {
    fn from(credential: &Credential) -> Self {
        Self {
            present: true,
            expires_at: Some(credential.expires_at),
            kind: Some(credential.kind.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, second).unwrap()
    }

    #[test]
    fn rejects_blank_fields() {
        assert!(Credential::new("", at(12, 0, 0), "Bearer").is_err());
        assert!(Credential::new("abc", at(12, 0, 0), " ").is_err());
        assert!(Credential::new("abc", at(12, 0, 0), "Bearer").is_ok());
    }

    #[test]
    fn usable_until_safety_buffer() {
        let credential = Credential::new("abc", at(12, 15, 0), "Bearer").unwrap();
        let buffer = Duration::seconds(60);

        assert!(credential.is_usable_at(at(12, 0, 0), buffer));
        assert!(credential.is_usable_at(at(12, 13, 59), buffer));
        assert!(!credential.is_usable_at(at(12, 14, 0), buffer));
        assert!(!credential.is_usable_at(at(12, 16, 0), buffer));
    }

    #[test]
    fn debug_redacts_token() {
        let credential = Credential::new("super-secret", at(12, 0, 0), "Bearer").unwrap();
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn info_omits_token() {
        let credential = Credential::new("abc", at(12, 0, 0), "Bearer").unwrap();
        let info = CredentialInfo::from(&credential);
        assert!(info.present);
        assert_eq!(info.kind.as_deref(), Some("Bearer"));

        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("abc"));

        assert!(!CredentialInfo::absent().present);
    }
}
