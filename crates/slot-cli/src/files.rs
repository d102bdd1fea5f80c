//! File-backed collaborators: a JSON calendar export, a preferences file, and a
//! recorded ranker answer.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::{json, Value};
use slot_engine::error::{Result, SlotError};
use slot_engine::interval::overlaps;
use slot_engine::ports::{BookingWriter, CalendarReader, PreferenceSource, SlotRanker};
use slot_engine::ranking::{RankedSelection, RankingRequest};
use slot_engine::{decode_events, BookingRecord, BusyEvent, NewBooking, Preferences};
use tracing::{info, warn};
use uuid::Uuid;

/// A calendar stored as a JSON file: either a bare array of events or an
/// events list response (`{"timeZone": ..., "items": [...]}`). A missing file
/// is an empty calendar.
pub struct JsonFileCalendar {
    path: PathBuf,
}

impl JsonFileCalendar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_raw(&self) -> Result<Option<String>> {
        read_optional(&self.path).map_err(|e| {
            SlotError::UpstreamUnavailable(format!("cannot read calendar {}: {e}", self.path.display()))
        })
    }

    fn read_value(&self) -> Result<Value> {
        match self.read_raw()? {
            None => Ok(Value::Array(Vec::new())),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                SlotError::UpstreamUnavailable(format!("malformed calendar {}: {e}", self.path.display()))
            }),
        }
    }
}

impl CalendarReader for JsonFileCalendar {
    fn fetch_busy_events(&self, time_min: DateTime<Tz>, time_max: DateTime<Tz>) -> Result<Vec<BusyEvent>> {
        let Some(raw) = self.read_raw()? else {
            return Ok(Vec::new());
        };
        let tz = time_min.timezone();
        let events = decode_events(&raw)?
            .into_iter()
            .filter(|e| {
                e.resolve(tz)
                    .is_some_and(|(start, end)| overlaps(start, end, time_min, time_max))
            })
            .collect();
        Ok(events)
    }

    fn calendar_timezone(&self) -> Result<Option<String>> {
        Ok(self
            .read_value()?
            .get("timeZone")
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

impl BookingWriter for JsonFileCalendar {
    fn create_booking_event(&self, booking: &NewBooking) -> Result<BookingRecord> {
        let event_id = Uuid::new_v4().simple().to_string();
        let mut event = json!({
            "id": event_id,
            "summary": booking.summary,
            "start": { "dateTime": booking.slot.start().to_rfc3339() },
            "end": { "dateTime": booking.slot.end().to_rfc3339() },
            "conferenceData": {
                "createRequest": {
                    "requestId": booking.conference_request_id.to_string(),
                    "conferenceSolutionKey": { "type": "hangoutsMeet" }
                }
            }
        });
        if let Some(email) = &booking.attendee_email {
            event["attendees"] = json!([{ "email": email }]);
        }

        let mut document = self.read_value()?;
        match &mut document {
            Value::Array(events) => events.push(event),
            Value::Object(map) => match map.get_mut("items") {
                Some(Value::Array(items)) => items.push(event),
                _ => {
                    map.insert("items".to_string(), Value::Array(vec![event]));
                }
            },
            _ => {
                return Err(SlotError::UpstreamUnavailable(format!(
                    "calendar {} is neither an event list nor an events response",
                    self.path.display()
                )))
            }
        }

        let body = serde_json::to_string_pretty(&document)
            .map_err(|e| SlotError::UpstreamUnavailable(format!("cannot encode calendar: {e}")))?;
        fs::write(&self.path, body).map_err(|e| {
            SlotError::UpstreamUnavailable(format!("cannot write calendar {}: {e}", self.path.display()))
        })?;

        info!(event_id = %event_id, path = %self.path.display(), "wrote booking to calendar file");
        Ok(BookingRecord {
            event_id,
            slot: booking.slot,
            summary: booking.summary.clone(),
            attendee_email: booking.attendee_email.clone(),
            conference_request_id: booking.conference_request_id,
        })
    }
}

/// The owner's preferences file. Missing means no preferences; an unreadable
/// or malformed file is logged and treated the same way.
pub struct JsonFilePreferences {
    path: Option<PathBuf>,
}

impl JsonFilePreferences {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl PreferenceSource for JsonFilePreferences {
    fn fetch_preferences(&self) -> Result<Preferences> {
        let Some(path) = &self.path else {
            return Ok(Preferences::default());
        };
        let raw = match read_optional(path) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Preferences::default()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read preferences file, using empty defaults");
                return Ok(Preferences::default());
            }
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "failed to parse preferences file, using empty defaults");
            Preferences::default()
        }))
    }
}

/// Replays a ranker answer saved to disk (`{"slots": [...], "message": ...}`).
pub struct RecordedRanker {
    answer: RankedSelection,
}

impl RecordedRanker {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(Self {
            answer: serde_json::from_str(&raw)?,
        })
    }
}

impl SlotRanker for RecordedRanker {
    fn rank_candidates(&self, _request: &RankingRequest<'_>) -> Result<RankedSelection> {
        Ok(self.answer.clone())
    }
}

fn read_optional(path: &Path) -> std::io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
