//! Booking payloads exchanged with the calendar writer.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Result, SlotError};
use crate::interval::TimeInterval;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
});

/// A booking the caller wants to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub slot: TimeInterval,
    pub attendee_email: Option<String>,
    pub summary: Option<String>,
}

impl BookingRequest {
    pub fn new(slot: TimeInterval) -> Self {
        Self {
            slot,
            attendee_email: None,
            summary: None,
        }
    }

    pub fn with_attendee(mut self, email: impl Into<String>) -> Self {
        self.attendee_email = Some(email.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// A validated booking handed to [`BookingWriter`](crate::ports::BookingWriter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBooking {
    pub slot: TimeInterval,
    pub summary: String,
    pub attendee_email: Option<String>,
    /// Idempotency key for the video conference attached to the event.
    pub conference_request_id: Uuid,
}

/// What the calendar reports back after the event is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRecord {
    pub event_id: String,
    pub slot: TimeInterval,
    pub summary: String,
    pub attendee_email: Option<String>,
    pub conference_request_id: Uuid,
}

impl NewBooking {
    /// Turn a request into a writable booking. The email, when given and
    /// non-blank, must look like `local@domain.tld`.
    pub fn from_request(request: &BookingRequest, default_summary: &str) -> Result<Self> {
        let attendee_email = match request.attendee_email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(email) => Some(validate_email(email)?.to_string()),
        };

        let summary = request
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_summary)
            .to_string();

        Ok(Self {
            slot: request.slot,
            summary,
            attendee_email,
            conference_request_id: Uuid::new_v4(),
        })
    }
}

/// Reject addresses that are not shaped like `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<&str> {
    if EMAIL_SHAPE.is_match(email) {
        Ok(email)
    } else {
        Err(SlotError::InvalidEmail(email.to_string()))
    }
}
