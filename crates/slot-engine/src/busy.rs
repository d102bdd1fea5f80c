//! Busy events read from the external calendar.
//!
//! The calendar hands back events in the Google Calendar shape, where each
//! endpoint is either `{"dateTime": "<RFC 3339>"}` or `{"date": "YYYY-MM-DD"}`.
//! Date-only endpoints mean midnight in the zone of the request.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::{localize, DstPolicy};
use crate::error::{Result, SlotError};
use crate::interval::{overlaps, TimeInterval};

/// One endpoint of a busy event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// All-day endpoint; resolved to local midnight in the query zone.
    Date(NaiveDate),
    /// A timed endpoint carrying its own offset.
    DateTime(DateTime<FixedOffset>),
}

impl EventTime {
    fn resolve(self, tz: Tz) -> Option<DateTime<Tz>> {
        match self {
            EventTime::DateTime(dt) => Some(dt.with_timezone(&tz)),
            EventTime::Date(d) => localize(tz, d.and_time(NaiveTime::MIN), DstPolicy::ShiftForward),
        }
    }
}

/// A time range the calendar owner is already committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyEvent {
    pub start: EventTime,
    pub end: EventTime,
}

impl BusyEvent {
    pub fn timed(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self {
            start: EventTime::DateTime(start),
            end: EventTime::DateTime(end),
        }
    }

    /// An all-day event covering `first_day` up to (excluding) `end_day`.
    pub fn all_day(first_day: NaiveDate, end_day: NaiveDate) -> Self {
        Self {
            start: EventTime::Date(first_day),
            end: EventTime::Date(end_day),
        }
    }

    /// The busy range as instants in `tz`.
    ///
    /// A date-only event whose end is not after its start covers one full day.
    pub fn resolve(&self, tz: Tz) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        let start = self.start.resolve(tz)?;
        let end = self.end.resolve(tz)?;
        match (self.start, self.end) {
            (EventTime::Date(_), EventTime::Date(_)) if end <= start => Some((start, start + Duration::days(1))),
            _ => Some((start, end)),
        }
    }

    /// Half-open overlap with `interval`, resolved in the interval's zone.
    pub fn overlaps(&self, interval: &TimeInterval) -> bool {
        self.resolve(interval.timezone())
            .is_some_and(|(b0, b1)| overlaps(interval.start(), interval.end(), b0, b1))
    }
}

/// One endpoint of a calendar event as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventTime {
    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// A calendar event as it appears on the wire. Fields beyond the time range
/// are carried through for callers that want them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub start: CalendarEventTime,
    pub end: CalendarEventTime,
}

impl TryFrom<&CalendarEvent> for BusyEvent {
    type Error = SlotError;

    fn try_from(event: &CalendarEvent) -> Result<Self> {
        Ok(BusyEvent {
            start: parse_event_time(&event.start)?,
            end: parse_event_time(&event.end)?,
        })
    }
}

/// A timed value wins over a date when both are present.
fn parse_event_time(raw: &CalendarEventTime) -> Result<EventTime> {
    if let Some(dt) = raw.date_time.as_deref() {
        return DateTime::parse_from_rfc3339(dt)
            .map(EventTime::DateTime)
            .map_err(|e| SlotError::UpstreamUnavailable(format!("malformed event dateTime '{dt}': {e}")));
    }
    if let Some(d) = raw.date.as_deref() {
        return NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map(EventTime::Date)
            .map_err(|e| SlotError::UpstreamUnavailable(format!("malformed event date '{d}': {e}")));
    }
    Err(SlotError::UpstreamUnavailable(
        "event endpoint has neither dateTime nor date".to_string(),
    ))
}

/// Decode a calendar export: either a bare JSON array of events or an events
/// list response (`{"items": [...]}`).
pub fn decode_events(json: &str) -> Result<Vec<BusyEvent>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Payload {
        Items { items: Vec<CalendarEvent> },
        Bare(Vec<CalendarEvent>),
    }

    let payload: Payload = serde_json::from_str(json)
        .map_err(|e| SlotError::UpstreamUnavailable(format!("malformed calendar payload: {e}")))?;
    let events = match payload {
        Payload::Items { items } => items,
        Payload::Bare(events) => events,
    };
    events.iter().map(BusyEvent::try_from).collect()
}
