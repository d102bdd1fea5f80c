//! Error types for slot-engine operations.
//!
//! Variants split into two families. Validation errors (`PastSlot`,
//! `RuleBlocked`, `Conflict`, `InvalidEmail`, plus input-parsing failures)
//! describe something wrong with what the caller asked for and are safe to show
//! verbatim. Server faults (`UpstreamUnavailable`, `Configuration`) carry detail
//! meant for logs, not for untrusted callers.

use chrono::DateTime;
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Cannot book a slot in the past (slot starts {start}, now is {now})")]
    PastSlot { start: DateTime<Tz>, now: DateTime<Tz> },

    #[error("This time slot is not available{}", reason_suffix(.reason))]
    RuleBlocked { reason: Option<String> },

    #[error("This time slot conflicts with an existing event ({busy_start} to {busy_end})")]
    Conflict {
        busy_start: DateTime<Tz>,
        busy_end: DateTime<Tz>,
    },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("No available slots in the requested horizon")]
    NoAvailableSlots,

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SlotError {
    /// Whether this error describes a problem with the caller's request.
    pub fn is_client_facing(&self) -> bool {
        !matches!(
            self,
            SlotError::UpstreamUnavailable(_) | SlotError::Configuration(_)
        )
    }

    /// Message suitable for an untrusted caller. Server faults collapse to a
    /// generic string; the full detail stays in `Display` for logging.
    pub fn public_message(&self) -> String {
        if self.is_client_facing() {
            self.to_string()
        } else {
            "The scheduling service is temporarily unavailable".to_string()
        }
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" ({r})"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, SlotError>;
