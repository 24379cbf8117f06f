//! Tests for utility functions

use chrono::{Duration, TimeZone, Utc};
use parking_facility::util::{init_tracing, init_tracing_with, parse_utc, Clock, ManualClock, SystemClock};

#[test]
fn test_manual_clock_moves_only_when_told() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    assert_eq!(clock.now(), start);
    clock.advance(Duration::minutes(61));
    assert_eq!(clock.now(), start + Duration::minutes(61));
    clock.set(start);
    assert_eq!(clock.now(), start);
}

#[test]
fn test_system_clock_is_utc_now() {
    let before = Utc::now();
    let now = SystemClock.now();
    assert!(now >= before);
}

#[test]
fn test_parse_utc_requires_offset() {
    let parsed = parse_utc("2024-06-01T12:00:00+02:00").unwrap();
    assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap());
    assert!(parse_utc("2024-06-01T12:00:00").is_none());
}

#[test]
fn test_tracing_init_is_idempotent() {
    init_tracing_with(false);
    init_tracing();
    init_tracing_with(true);
    tracing::info!("still logging");
}
