//! Candidate slot generation from availability windows.
//!
//! Walks each open sub-range in fixed steps and keeps the slots that overlap no
//! busy event and no rule block. The rule check repeats what the window builder
//! already did; both must agree, and a slot only survives if it passes both.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use tracing::debug;

use crate::busy::BusyEvent;
use crate::dst::{localize, DstPolicy};
use crate::interval::{overlaps, TimeInterval};
use crate::rules::{is_blocked, BlockingRule};
use crate::window::AvailabilityWindows;

/// A generated interval, free of busy events and rule blocks at generation time.
///
/// Advisory only: the calendar may change before the user books it.
pub type CandidateSlot = TimeInterval;

/// Generate candidate slots of `slot_duration` in `tz`.
///
/// Output is chronological: dates ascending, then sub-ranges, then time.
/// Within a sub-range slots start at the sub-range start and advance by
/// `slot_duration`, stopping before a slot would end past the sub-range end or
/// cross into the next calendar date. Slot starts that do not exist locally
/// (DST gap) are skipped. A non-positive duration, or one longer than a day,
/// yields no slots.
pub fn generate_slots(
    windows: &AvailabilityWindows,
    busy_events: &[BusyEvent],
    rules: &[BlockingRule],
    slot_duration: Duration,
    tz: Tz,
) -> Vec<CandidateSlot> {
    if slot_duration <= Duration::zero() || slot_duration > Duration::days(1) {
        return Vec::new();
    }

    let busy: Vec<(DateTime<Tz>, DateTime<Tz>)> = busy_events.iter().filter_map(|e| e.resolve(tz)).collect();

    let mut slots = Vec::new();
    for (date, ranges) in windows {
        for range in ranges {
            let mut cursor = date.and_time(range.start());

            while cursor.date() == *date && cursor.time() < range.end() {
                let local_start = cursor;
                cursor += slot_duration;

                let Some(start) = localize(tz, local_start, DstPolicy::Skip) else {
                    continue;
                };
                let end = start + slot_duration;
                let local_end = end.naive_local();
                if local_end.date() != *date || local_end.time() > range.end() {
                    break;
                }

                let Ok(slot) = TimeInterval::new(start, end) else {
                    continue;
                };
                let is_busy = busy.iter().any(|(b0, b1)| overlaps(start, end, *b0, *b1));
                if !is_busy && !is_blocked(&slot, rules) {
                    slots.push(slot);
                }
            }
        }
    }

    debug!(
        count = slots.len(),
        busy = busy.len(),
        rules = rules.len(),
        "generated candidate slots"
    );
    slots
}
