//! The authoritative gate run immediately before a booking is written.
//!
//! Generated candidates can be stale by the time a user picks one. This check
//! never trusts them: it re-reads busy events for exactly the slot's range from
//! the live calendar on every call.

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::error::{Result, SlotError};
use crate::interval::{overlaps, TimeInterval};
use crate::ports::CalendarReader;
use crate::rules::{blocking_rule, BlockingRule};

/// Validate one proposed slot. Checks run in order and stop at the first
/// failure:
///
/// 1. the slot does not start before `now` (`PastSlot`);
/// 2. no blocking rule intersects it (`RuleBlocked`);
/// 3. no live busy event in `[slot.start, slot.end)` overlaps it (`Conflict`).
///
/// A failed calendar read propagates as-is.
pub fn validate_slot(
    slot: &TimeInterval,
    now: DateTime<Tz>,
    rules: &[BlockingRule],
    calendar: &dyn CalendarReader,
) -> Result<()> {
    if slot.start() < now {
        info!(start = %slot.start(), now = %now, "rejected slot in the past");
        return Err(SlotError::PastSlot {
            start: slot.start(),
            now,
        });
    }

    if let Some(rule) = blocking_rule(slot, rules) {
        info!(start = %slot.start(), reason = ?rule.reason, "rejected rule-blocked slot");
        return Err(SlotError::RuleBlocked {
            reason: rule.reason.clone(),
        });
    }

    let tz = slot.timezone();
    let busy = calendar.fetch_busy_events(slot.start(), slot.end())?;
    for event in &busy {
        let (busy_start, busy_end) = event.resolve(tz).ok_or_else(|| {
            SlotError::UpstreamUnavailable(format!("busy event {event:?} has no instant in {tz}"))
        })?;
        if overlaps(slot.start(), slot.end(), busy_start, busy_end) {
            info!(start = %slot.start(), busy_start = %busy_start, "rejected conflicting slot");
            return Err(SlotError::Conflict { busy_start, busy_end });
        }
    }

    debug!(start = %slot.start(), checked = busy.len(), "slot passed validation");
    Ok(())
}
