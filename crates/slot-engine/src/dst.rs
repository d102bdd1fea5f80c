//! DST transition policies for wall-clock times.
//!
//! Availability is expressed in local clock times ("07:00", "22:00") but every
//! comparison happens on zoned instants. A local time can be missing (the
//! spring-forward gap) or ambiguous (the fall-back overlap); the policy decides
//! what instant, if any, it maps to.

use chrono::{Duration, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Policy for local times that fall into a DST transition.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DstPolicy {
    /// Drop local times that fall in the DST gap (no instant is produced).
    #[default]
    Skip,
    /// Move gap times forward to the first valid instant after the gap.
    ShiftForward,
}

/// Resolve a naive local datetime to an instant in `tz`.
///
/// Ambiguous times resolve to the earliest candidate under either policy.
pub fn localize(tz: Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<chrono::DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => shift_past_gap(tz, local),
        },
    }
}

/// Walk forward minute by minute until the local time exists again.
/// Real-world gaps are at most two hours.
fn shift_past_gap(tz: Tz, local: NaiveDateTime) -> Option<chrono::DateTime<Tz>> {
    (1..=180).find_map(|m| {
        tz.from_local_datetime(&(local + Duration::minutes(m)))
            .earliest()
    })
}
