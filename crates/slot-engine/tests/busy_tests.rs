//! Tests for busy event resolution and calendar payload decoding.

use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;
use slot_engine::busy::EventTime;
use slot_engine::{decode_events, BusyEvent, SlotError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn decodes_timed_and_all_day_events() {
    let json = r#"[
        {"summary": "Standup", "start": {"dateTime": "2026-03-16T09:00:00Z"}, "end": {"dateTime": "2026-03-16T09:15:00Z"}},
        {"start": {"date": "2026-03-17"}, "end": {"date": "2026-03-18"}}
    ]"#;

    let events = decode_events(json).unwrap();

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0].start, EventTime::DateTime(_)));
    assert_eq!(events[1], BusyEvent::all_day(date(2026, 3, 17), date(2026, 3, 18)));
}

#[test]
fn decodes_list_response_with_items() {
    let json = r#"{"kind": "calendar#events", "items": [
        {"start": {"dateTime": "2026-03-16T09:00:00-07:00"}, "end": {"dateTime": "2026-03-16T10:00:00-07:00"}}
    ]}"#;

    let events = decode_events(json).unwrap();

    assert_eq!(events.len(), 1);
}

#[test]
fn date_only_event_is_local_midnight_in_query_zone() {
    let berlin: Tz = "Europe/Berlin".parse().unwrap();
    let event = BusyEvent::all_day(date(2026, 3, 17), date(2026, 3, 18));

    let (start, end) = event.resolve(berlin).unwrap();

    assert_eq!(start, berlin.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap());
    assert_eq!(end, berlin.with_ymd_and_hms(2026, 3, 18, 0, 0, 0).unwrap());
}

#[test]
fn date_only_event_without_later_end_covers_one_day() {
    let event = BusyEvent::all_day(date(2026, 3, 17), date(2026, 3, 17));

    let (start, end) = event.resolve(chrono_tz::UTC).unwrap();

    assert_eq!(end - start, chrono::Duration::days(1));
}

#[test]
fn malformed_event_is_an_upstream_failure() {
    let json = r#"[{"start": {"dateTime": "tomorrow-ish"}, "end": {"dateTime": "2026-03-16T10:00:00Z"}}]"#;
    let err = decode_events(json).unwrap_err();
    assert!(matches!(err, SlotError::UpstreamUnavailable(_)));

    let json = r#"[{"start": {}, "end": {"date": "2026-03-16"}}]"#;
    let err = decode_events(json).unwrap_err();
    assert!(matches!(err, SlotError::UpstreamUnavailable(_)));
}

#[test]
fn non_json_payload_is_an_upstream_failure() {
    let err = decode_events("<html>502</html>").unwrap_err();
    assert!(matches!(err, SlotError::UpstreamUnavailable(_)));
}
