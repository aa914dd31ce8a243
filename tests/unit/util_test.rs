//! Tests for utility functions

use std::sync::Arc;

use case_allocator::util::clock::{format_timestamp, parse_timestamp, Clock, ManualClock, SystemClock};
use chrono::{TimeDelta, TimeZone, Utc};

#[test]
fn test_timestamp_format_is_millisecond_utc() {
    let at = Utc.with_ymd_and_hms(2026, 1, 31, 9, 30, 0).unwrap();
    assert_eq!(format_timestamp(at), "2026-01-31T09:30:00.000Z");
}

#[test]
fn test_timestamp_parse_accepts_offsets() {
    let parsed = parse_timestamp("2026-01-31T11:30:00+02:00").unwrap();
    assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 31, 9, 30, 0).unwrap());
    assert!(parse_timestamp("not a date").is_none());
}

#[test]
fn test_manual_clock_only_moves_when_told() {
    let start = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    assert_eq!(clock.now(), start);
    clock.advance(TimeDelta::hours(25));
    assert_eq!(clock.now(), start + TimeDelta::hours(25));
    clock.set(start);
    assert_eq!(clock.now(), start);
}

#[test]
fn test_clocks_are_object_safe() {
    let clocks: Vec<Arc<dyn Clock>> = vec![
        Arc::new(SystemClock),
        Arc::new(ManualClock::new(Utc::now())),
    ];
    assert!(clocks.iter().all(|c| c.now().timestamp() > 0));
}

#[test]
fn test_tracing_init_is_idempotent() {
    case_allocator::util::init_tracing();
    case_allocator::util::init_tracing_with_level("debug");
    tracing::info!("tracing initialized twice without panicking");
}
