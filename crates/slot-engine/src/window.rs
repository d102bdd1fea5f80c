//! Per-day availability windows: a base daily window minus rule blocks.
//!
//! Everything here works on clock times, not instants. Subtraction is a pure
//! function over `ClockRange` slices; each rule re-derives the ranges from the
//! list accumulated so far. Set subtraction commutes, so rule order does not
//! change the result.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::{Result, SlotError};
use crate::rules::BlockingRule;

/// Open sub-ranges per calendar date, dates ascending.
pub type AvailabilityWindows = BTreeMap<NaiveDate, Vec<ClockRange>>;

/// The last representable clock time of a day. Used as the exclusive end of
/// "until midnight" blocks, so `[start, end_of_day())` covers everything up to
/// 24:00 that a same-day range can reach.
pub fn end_of_day() -> NaiveTime {
    NaiveTime::MIN - Duration::nanoseconds(1)
}

/// A half-open `[start, end)` clock-time range within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClockRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl ClockRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if start >= end {
            return Err(SlotError::InvalidInterval(format!(
                "clock range {} - {} is empty or inverted",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Remove `[block_start, block_end)` from this range.
    ///
    /// Yields the left remainder `[start, block_start)` when non-empty and the
    /// right remainder `[block_end, end)` when non-empty. A disjoint block
    /// leaves the range untouched; a covering block removes it.
    fn minus(self, block_start: NaiveTime, block_end: NaiveTime) -> Vec<ClockRange> {
        if block_end <= self.start || block_start >= self.end {
            return vec![self];
        }

        let mut remainder = Vec::with_capacity(2);
        if self.start < block_start {
            remainder.push(ClockRange {
                start: self.start,
                end: block_start,
            });
        }
        if block_end < self.end {
            remainder.push(ClockRange {
                start: block_end,
                end: self.end,
            });
        }
        remainder
    }
}

/// Subtract one block from every range in `ranges`, returning a new list.
///
/// Input ranges that are disjoint and sorted stay disjoint and sorted.
pub fn subtract_block(ranges: &[ClockRange], block_start: NaiveTime, block_end: NaiveTime) -> Vec<ClockRange> {
    ranges
        .iter()
        .flat_map(|r| r.minus(block_start, block_end))
        .collect()
}

/// Build availability windows for `horizon_days` consecutive dates starting at
/// `first_date`.
///
/// Each date starts with `base`. For every rule that applies on a date:
/// - non-overnight rules remove `[start, end)` from that date;
/// - overnight rules remove `[start, 24:00)` from that date and `[00:00, end)`
///   from the following date, when that date is inside the horizon.
pub fn build_windows(
    base: ClockRange,
    rules: &[BlockingRule],
    horizon_days: u32,
    first_date: NaiveDate,
) -> AvailabilityWindows {
    let dates: Vec<NaiveDate> = first_date
        .iter_days()
        .take(horizon_days as usize)
        .collect();

    let mut windows: AvailabilityWindows = dates.iter().map(|d| (*d, vec![base])).collect();

    for rule in rules {
        for date in &dates {
            if !rule.applies_on(date.weekday()) {
                continue;
            }

            if rule.is_overnight() {
                apply_block(&mut windows, *date, rule.start, end_of_day());
                if let Some(next) = date.succ_opt() {
                    apply_block(&mut windows, next, NaiveTime::MIN, rule.end);
                }
            } else {
                apply_block(&mut windows, *date, rule.start, rule.end);
            }
        }
    }

    windows
}

/// Replace the ranges of `date` with their remainder after the block.
/// Dates outside the map are left alone.
fn apply_block(windows: &mut AvailabilityWindows, date: NaiveDate, block_start: NaiveTime, block_end: NaiveTime) {
    if let Some(ranges) = windows.get_mut(&date) {
        *ranges = subtract_block(ranges, block_start, block_end);
    }
}
