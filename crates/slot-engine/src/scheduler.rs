//! The three operations exposed to callers: list candidates, rank and present
//! them, and book one.
//!
//! A [`Scheduler`] holds borrowed collaborators and a validated config. It has
//! no mutable state: every call reads the calendar and the preference store
//! fresh, because a stale snapshot is how double bookings happen.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::booking::{BookingRecord, BookingRequest, NewBooking};
use crate::config::{SchedulerConfig, MAX_HORIZON_DAYS};
use crate::error::{Result, SlotError};
use crate::ports::{BookingWriter, CalendarReader, Clock, PreferenceSource, SlotRanker};
use crate::ranking::{self, Presentation};
use crate::slots::{generate_slots, CandidateSlot};
use crate::validator::validate_slot;
use crate::window::build_windows;

/// Everything the scheduler reads from or writes to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub calendar: &'a dyn CalendarReader,
    pub writer: &'a dyn BookingWriter,
    pub preferences: &'a dyn PreferenceSource,
    pub ranker: &'a dyn SlotRanker,
    pub clock: &'a dyn Clock,
}

pub struct Scheduler<'a> {
    deps: Collaborators<'a>,
    config: SchedulerConfig,
}

impl<'a> Scheduler<'a> {
    /// Fails with `Configuration` if `config` does not validate.
    pub fn new(deps: Collaborators<'a>, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { deps, config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Pick the zone for a request: the requested zone if it parses, else the
    /// calendar's declared zone, else the configured default.
    pub fn resolve_timezone(&self, requested: Option<&str>) -> Result<Tz> {
        if let Some(name) = requested.map(str::trim).filter(|n| !n.is_empty()) {
            match name.parse::<Tz>() {
                Ok(tz) => return Ok(tz),
                Err(_) => warn!(timezone = name, "unknown requested timezone; trying calendar zone"),
            }
        }

        if let Some(name) = self.deps.calendar.calendar_timezone()? {
            match name.parse::<Tz>() {
                Ok(tz) => return Ok(tz),
                Err(_) => warn!(timezone = %name, "unknown calendar timezone; using default"),
            }
        }

        self.config.default_tz()
    }

    /// The request-local "now".
    pub fn now_in(&self, tz: Tz) -> DateTime<Tz> {
        self.deps.clock.now().with_timezone(&tz)
    }

    /// Candidate slots from now through `horizon_days` calendar days (today
    /// included), chronological. Slots that already started are left out.
    pub fn list_candidate_slots(&self, timezone: Option<&str>, horizon_days: Option<u32>) -> Result<Vec<CandidateSlot>> {
        let horizon_days = horizon_days.unwrap_or(self.config.horizon_days);
        if !(1..=MAX_HORIZON_DAYS).contains(&horizon_days) {
            return Err(SlotError::InvalidInterval(format!(
                "horizon must cover between 1 and {MAX_HORIZON_DAYS} days, got {horizon_days}"
            )));
        }

        let tz = self.resolve_timezone(timezone)?;
        let now = self.now_in(tz);
        let horizon_end = Duration::try_days(i64::from(horizon_days))
            .and_then(|span| now.checked_add_signed(span))
            .ok_or_else(|| SlotError::InvalidInterval(format!("horizon of {horizon_days} days is out of range")))?;

        let busy = self.deps.calendar.fetch_busy_events(now, horizon_end)?;
        let rules = self.deps.preferences.fetch_preference_rules()?;

        let windows = build_windows(self.config.base_window()?, &rules, horizon_days, now.date_naive());
        let mut slots = generate_slots(&windows, &busy, &rules, self.config.slot_duration()?, tz);
        slots.retain(|slot| slot.start() >= now);

        info!(
            timezone = %tz,
            horizon_days,
            busy = busy.len(),
            rules = rules.len(),
            candidates = slots.len(),
            "listed candidate slots"
        );
        Ok(slots)
    }

    /// Ask the ranker to pick from `candidates` for `user_text`.
    ///
    /// A failing preference read only loses the batching hint; it never blocks
    /// presenting slots.
    pub fn rank_and_present(&self, candidates: &[CandidateSlot], user_text: Option<&str>) -> Result<Presentation> {
        let batch_meetings = match self.deps.preferences.fetch_preferences() {
            Ok(prefs) => prefs.batch_meetings,
            Err(e) => {
                warn!(error = %e, "could not read preferences for ranking hints");
                false
            }
        };

        ranking::rank_and_present(
            self.deps.ranker,
            candidates,
            user_text,
            batch_meetings,
            self.config.ranking_limits(),
        )
    }

    /// Validate `request` against the live calendar and rules, then write it.
    ///
    /// The validator runs immediately before the write and is never skipped.
    /// Two concurrent bookings of the same slot can still race between the
    /// check and the write; the calendar service is the only arbiter there.
    pub fn book_slot(&self, request: &BookingRequest) -> Result<BookingRecord> {
        let slot = request.slot;
        let now = self.now_in(slot.timezone());
        let rules = self.deps.preferences.fetch_preference_rules()?;

        validate_slot(&slot, now, &rules, self.deps.calendar)?;
        let booking = NewBooking::from_request(request, &self.config.default_summary)?;
        let record = self.deps.writer.create_booking_event(&booking)?;

        info!(
            event_id = %record.event_id,
            start = %record.slot.start(),
            attendee = record.attendee_email.is_some(),
            "booked slot"
        );
        Ok(record)
    }
}
