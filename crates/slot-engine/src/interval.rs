//! Half-open time intervals on zoned instants.
//!
//! Every overlap test in the engine goes through [`TimeInterval::overlaps`]:
//! `[a.start, a.end)` and `[b.start, b.end)` overlap iff
//! `a.start < b.end && b.start < a.end`. Intervals that merely touch (one ends
//! exactly when the other starts) do NOT overlap.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{Result, SlotError};

/// An immutable `[start, end)` interval with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeInterval {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl TimeInterval {
    /// Build an interval, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self> {
        if start >= end {
            return Err(SlotError::InvalidInterval(format!(
                "start {} is not before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Build an interval of `duration` starting at `start`.
    pub fn starting_at(start: DateTime<Tz>, duration: Duration) -> Result<Self> {
        Self::new(start, start + duration)
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The zone both endpoints are expressed in.
    pub fn timezone(&self) -> Tz {
        self.start.timezone()
    }

    /// Half-open overlap test against any other interval.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// Re-express both endpoints in `tz`. The instants are unchanged.
    pub fn with_timezone(&self, tz: Tz) -> Self {
        Self {
            start: self.start.with_timezone(&tz),
            end: self.end.with_timezone(&tz),
        }
    }
}

/// Half-open overlap of `[a_start, a_end)` and `[b_start, b_end)`.
///
/// Comparison is on instants, so the two ranges may carry different zones.
pub fn overlaps<A, B>(a_start: DateTime<A>, a_end: DateTime<A>, b_start: DateTime<B>, b_end: DateTime<B>) -> bool
where
    A: chrono::TimeZone,
    B: chrono::TimeZone,
{
    a_start < b_end && b_start < a_end
}
