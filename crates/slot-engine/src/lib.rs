//! # slot-engine
//!
//! Availability engine for booking meetings against a calendar.
//!
//! Turns a calendar's busy events plus the owner's recurring blocking rules
//! into a precise list of bookable slots, hands them to a ranker for
//! free-text matching, and re-validates the chosen slot against the live
//! calendar right before it is written.
//!
//! ## Pipeline
//!
//! busy events + rules → [`rules`] (predicate) → [`window`] (per-day open
//! ranges) → [`slots`] (candidates) → [`ranking`] (advisory pick) →
//! [`validator`] (final gate) → booking.
//!
//! ## Modules
//!
//! - [`interval`]: half-open `[start, end)` intervals on zoned instants
//! - [`rules`]: weekly blocking rules and `is_blocked`
//! - [`window`]: base daily window minus rule blocks, per date
//! - [`slots`]: fixed-step candidate generation
//! - [`validator`]: booking-time re-validation
//! - [`busy`]: busy events and calendar payload decoding
//! - [`ranking`]: ranker sampling, anti-hallucination filter, fallback
//! - [`booking`]: booking payloads and attendee email checks
//! - [`scheduler`]: the caller-facing facade over injected collaborators
//! - [`ports`]: collaborator traits (calendar, preferences, ranker, clock)
//! - [`dst`]: DST gap/overlap resolution for local clock times
//! - [`config`]: tunables with environment overrides
//! - [`error`]: error taxonomy

pub mod booking;
pub mod busy;
pub mod config;
pub mod dst;
pub mod error;
pub mod interval;
pub mod ports;
pub mod ranking;
pub mod rules;
pub mod scheduler;
pub mod slots;
pub mod validator;
pub mod window;

pub use booking::{BookingRecord, BookingRequest, NewBooking};
pub use busy::{decode_events, BusyEvent, CalendarEvent};
pub use config::SchedulerConfig;
pub use error::SlotError;
pub use interval::TimeInterval;
pub use ranking::{rank_and_present, Presentation, RankedSelection, SlotRef};
pub use rules::{is_blocked, BlockingRule, Preferences};
pub use scheduler::{Collaborators, Scheduler};
pub use slots::{generate_slots, CandidateSlot};
pub use validator::validate_slot;
pub use window::{build_windows, AvailabilityWindows, ClockRange};
