//! Credential expiry parsing
//!
//! Token issuers describe a credential lifetime either relative to "now"
//! (`"900"`, `"60s"`, `"15m"`, `"1h"`, `"1d"`) or as an absolute instant
//! (`"2024-05-01T12:00:00Z"`). [`parse_expiry`] resolves both forms to a UTC
//! instant.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use thiserror::Error;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Error type for expiry parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpiryParseError {
    #[error("Empty expiry expression")]
    EmptyString,

    #[error("Unrecognized expiry format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(char),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Expiry out of range: {0}")]
    OutOfRange(String),
}

/// Resolve an expiry expression to an absolute instant relative to `now`.
///
/// Supported forms:
/// - `"3600"` - bare integer, seconds
/// - `"60s"`, `"5m"`, `"1h"`, `"1d"` - integer with a unit suffix
/// - `"2024-05-01T12:00:00Z"` - RFC 3339 instant
/// - `"2024-05-01 12:00:00"` - naive timestamp, interpreted as UTC
///
/// Surrounding whitespace is ignored. The result depends only on `expr` and
/// `now`.
///
/// # Errors
///
/// Returns [`ExpiryParseError`] when the expression matches none of the forms
/// above or when the resulting instant does not fit the calendar range.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
///
/// use parley_common::time::expiry::parse_expiry;
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(parse_expiry("3600", now).unwrap(), now + Duration::hours(1));
/// assert_eq!(parse_expiry("1d", now).unwrap(), now + Duration::days(1));
/// assert!(parse_expiry("soon", now).is_err());
/// ```
pub fn parse_expiry(expr: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ExpiryParseError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(ExpiryParseError::EmptyString);
    }

    if is_all_digits(expr) {
        let seconds = parse_count(expr)?;
        return offset(now, seconds, expr);
    }

    if looks_like_timestamp(expr) {
        return parse_timestamp(expr);
    }

    // Relative form: digits followed by a single unit character.
    let Some(unit) = expr.chars().last() else {
        return Err(ExpiryParseError::EmptyString);
    };
    let digits = &expr[..expr.len() - unit.len_utf8()];
    if digits.is_empty() {
        return Err(ExpiryParseError::InvalidFormat(expr.to_string()));
    }
    if !is_all_digits(digits) {
        return Err(ExpiryParseError::InvalidNumber(digits.to_string()));
    }

    let multiplier: u64 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3_600,
        'd' => 86_400,
        other => return Err(ExpiryParseError::UnknownUnit(other)),
    };

    let seconds = parse_count(digits)?
        .checked_mul(multiplier)
        .ok_or_else(|| ExpiryParseError::OutOfRange(expr.to_string()))?;
    offset(now, seconds, expr)
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// A leading digit run followed by a date separator (`-` or `/`), or any
/// `T` or `:` separator.
fn looks_like_timestamp(s: &str) -> bool {
    let leading_digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let date_separator = s[leading_digits..].starts_with(&['-', '/'][..]);
    (leading_digits > 0 && date_separator) || s.contains(&['T', ':'][..])
}

fn parse_count(digits: &str) -> Result<u64, ExpiryParseError> {
    digits.parse::<u64>().map_err(|_| ExpiryParseError::OutOfRange(digits.to_string()))
}

fn offset(
    now: DateTime<Utc>,
    seconds: u64,
    expr: &str,
) -> Result<DateTime<Utc>, ExpiryParseError> {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| ExpiryParseError::OutOfRange(expr.to_string()))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ExpiryParseError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Ok(instant.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ExpiryParseError::InvalidTimestamp(s.to_string()))
}
