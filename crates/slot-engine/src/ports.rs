//! External collaborators the engine talks to.
//!
//! Nothing in the engine reaches for a global: the calendar, the preference
//! store, the ranker and the clock are passed in, so tests can hand in fakes.
//! Implementations must report failures as [`SlotError::UpstreamUnavailable`]
//! (or [`SlotError::Configuration`] when no source can be resolved) instead of
//! returning partial data.
//!
//! [`SlotError::UpstreamUnavailable`]: crate::error::SlotError::UpstreamUnavailable
//! [`SlotError::Configuration`]: crate::error::SlotError::Configuration

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::booking::{BookingRecord, NewBooking};
use crate::busy::BusyEvent;
use crate::error::Result;
use crate::ranking::{RankedSelection, RankingRequest};
use crate::rules::{BlockingRule, Preferences};

/// Read access to the external calendar.
pub trait CalendarReader {
    /// Busy events intersecting `[time_min, time_max)`, read live.
    fn fetch_busy_events(&self, time_min: DateTime<Tz>, time_max: DateTime<Tz>) -> Result<Vec<BusyEvent>>;

    /// The IANA zone the calendar declares, if any.
    fn calendar_timezone(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Write access to the external calendar.
pub trait BookingWriter {
    fn create_booking_event(&self, booking: &NewBooking) -> Result<BookingRecord>;
}

/// The store holding the owner's scheduling preferences.
pub trait PreferenceSource {
    fn fetch_preferences(&self) -> Result<Preferences>;

    fn fetch_preference_rules(&self) -> Result<Vec<BlockingRule>> {
        Ok(self.fetch_preferences()?.no_meetings)
    }
}

/// The AI ranking step. Its answer is advisory and gets filtered.
pub trait SlotRanker {
    fn rank_candidates(&self, request: &RankingRequest<'_>) -> Result<RankedSelection>;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
