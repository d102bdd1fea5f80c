//! Recurring weekly blocking rules and the "is this interval blocked?" predicate.
//!
//! A rule names weekdays and a clock-time window. When `end <= start` the rule
//! is *overnight*: it blocks `[start, 24:00)` on a matching day and
//! `[00:00, end)` in the small hours. `end == start` is treated as overnight,
//! never as a zero-length rule.
//!
//! [`is_blocked`] checks an interval against the rule blocks anchored to the
//! calendar date of the interval's start. For an overnight rule both blocks are
//! anchored to that same date; pushing the morning portion onto the following
//! date is the window builder's job (see [`crate::window`]).

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::{localize, DstPolicy};
use crate::interval::{overlaps, TimeInterval};

/// A recurring weekly rule excluding a clock-time window on some weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingRule {
    /// Weekdays the rule applies to. An empty list never matches.
    #[serde(with = "weekday_names")]
    pub days: Vec<Weekday>,
    #[serde(with = "clock_time")]
    pub start: NaiveTime,
    #[serde(with = "clock_time")]
    pub end: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BlockingRule {
    pub fn new(days: impl IntoIterator<Item = Weekday>, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            days: days.into_iter().collect(),
            start,
            end,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// True when the rule wraps past midnight (`end <= start`).
    pub fn is_overnight(&self) -> bool {
        self.end <= self.start
    }

    pub fn applies_on(&self, weekday: Weekday) -> bool {
        self.days.contains(&weekday)
    }

    /// The blocked instants this rule contributes on `date`, as half-open
    /// `(start, end)` pairs in `tz`.
    fn blocks_on(&self, date: NaiveDate, tz: Tz) -> Vec<(DateTime<Tz>, DateTime<Tz>)> {
        let at = |d: NaiveDate, t: NaiveTime| localize(tz, d.and_time(t), DstPolicy::ShiftForward);
        let next_midnight = date.succ_opt().and_then(|next| at(next, NaiveTime::MIN));

        let pairs = if self.is_overnight() {
            vec![
                (at(date, self.start), next_midnight),
                (at(date, NaiveTime::MIN), at(date, self.end)),
            ]
        } else {
            vec![(at(date, self.start), at(date, self.end))]
        };

        pairs
            .into_iter()
            .filter_map(|(s, e)| Some((s?, e?)))
            .filter(|(s, e)| s < e)
            .collect()
    }
}

/// The user's scheduling preferences document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub no_meetings: Vec<BlockingRule>,
    /// Hint for the ranker: prefer back-to-back meetings.
    #[serde(default)]
    pub batch_meetings: bool,
}

/// Return true iff `interval` intersects the blocked region of any rule that
/// applies on the weekday of `interval.start`'s date.
///
/// Exact boundary touches are not overlaps: `[08:00, 09:00)` is not blocked by
/// a `09:00-10:00` rule.
pub fn is_blocked(interval: &TimeInterval, rules: &[BlockingRule]) -> bool {
    blocking_rule(interval, rules).is_some()
}

/// Like [`is_blocked`], but returns the first matching rule.
pub fn blocking_rule<'a>(interval: &TimeInterval, rules: &'a [BlockingRule]) -> Option<&'a BlockingRule> {
    let start = interval.start();
    let date = start.date_naive();
    let weekday = date.weekday();
    let tz = interval.timezone();

    rules.iter().filter(|rule| rule.applies_on(weekday)).find(|rule| {
        rule.blocks_on(date, tz)
            .into_iter()
            .any(|(b0, b1)| overlaps(interval.start(), interval.end(), b0, b1))
    })
}

/// English weekday names ("Monday") on the wire; chrono's parser also accepts
/// three-letter abbreviations. An unrecognised name is dropped with a warning,
/// so the rule still applies on its other days and a rule left with no days
/// never matches.
mod weekday_names {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::warn;

    fn full_name(day: Weekday) -> &'static str {
        match day {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(days.iter().map(|d| full_name(*d)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Weekday>, D::Error> {
        let days = Vec::<String>::deserialize(deserializer)?
            .iter()
            .filter_map(|name| match name.trim().parse::<Weekday>() {
                Ok(day) => Some(day),
                Err(_) => {
                    warn!(day = %name, "ignoring unknown weekday in blocking rule");
                    None
                }
            })
            .collect();
        Ok(days)
    }
}

/// `HH:MM` clock times (seconds accepted on input).
mod clock_time {
    use chrono::NaiveTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(|e| D::Error::custom(format!("invalid clock time '{raw}': {e}")))
    }
}
