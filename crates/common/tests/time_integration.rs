//! Integration tests for the `time` and `resilience` modules.
//!
//! These tests drive expiry parsing with the mock clock the way the
//! credential layer does, and check the backoff schedule end to end.

#![cfg(feature = "runtime")]

use std::time::Duration as StdDuration;

use chrono::{Duration, TimeZone, Utc};
use parley_common::time::{parse_expiry, Clock, ExpiryParseError, MockClock};
use parley_common::ExponentialBackoff;

/// Verifies every relative form the issuance endpoint is known to emit.
#[test]
fn test_relative_expiry_forms() {
    let clock = MockClock::starting_at(Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap());
    let now = clock.now();

    let cases = [
        ("3600", Duration::seconds(3_600)),
        ("900", Duration::seconds(900)),
        ("60s", Duration::seconds(60)),
        ("5m", Duration::minutes(5)),
        ("1h", Duration::hours(1)),
        ("1d", Duration::days(1)),
    ];

    for (input, expected) in cases {
        let parsed = parse_expiry(input, now).expect("expiry should parse");
        assert_eq!(parsed - now, expected, "offset mismatch for input {input}");
    }
}

/// Verifies that an expiry computed at one instant is judged against a clock
/// that keeps moving.
#[test]
fn test_expiry_against_advancing_clock() {
    let clock = MockClock::starting_at(Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap());
    let expires_at = parse_expiry("15m", clock.now()).expect("expiry should parse");

    clock.advance_secs(14 * 60);
    assert!(clock.now() < expires_at);

    clock.advance_secs(60);
    assert_eq!(clock.now(), expires_at);
}

/// Verifies that absolute instants ignore the reference time entirely.
#[test]
fn test_absolute_expiry_is_independent_of_now() {
    let expected = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let late = Utc.with_ymd_and_hms(2029, 1, 1, 0, 0, 0).unwrap();

    assert_eq!(parse_expiry("2030-01-01T00:00:00Z", early).unwrap(), expected);
    assert_eq!(parse_expiry("2030-01-01T00:00:00Z", late).unwrap(), expected);
}

/// Verifies error variants for malformed expressions.
#[test]
fn test_invalid_expressions() {
    let now = Utc::now();
    assert_eq!(parse_expiry("\t", now), Err(ExpiryParseError::EmptyString));
    assert_eq!(parse_expiry("10w", now), Err(ExpiryParseError::UnknownUnit('w')));
    assert!(parse_expiry("forever", now).is_err());
    assert!(parse_expiry("2024-02-30", now).is_err());
}

/// Verifies the backoff schedule under virtual time.
#[tokio::test(start_paused = true)]
async fn test_backoff_schedule_under_virtual_time() {
    let backoff = ExponentialBackoff::new(StdDuration::from_millis(250));
    let started = tokio::time::Instant::now();

    for attempt in 1..=3 {
        backoff.wait(attempt).await;
    }

    // 250 + 500 + 1000
    assert_eq!(started.elapsed(), StdDuration::from_millis(1_750));
}
