//! Scheduler configuration.
//!
//! Every tunable the engine uses lives here, with defaults matching the
//! booking assistant's behavior: a 07:00-22:00 daily window, one-hour slots,
//! a seven-day horizon, UTC when no zone can be resolved.
//!
//! Values can be overridden from `SLOTS_*` environment variables; call
//! [`load_dotenv`] first to pick up a `.env` file.

use std::env;
use std::str::FromStr;

use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::warn;

use crate::error::{Result, SlotError};
use crate::ranking::RankingLimits;
use crate::window::ClockRange;

/// Longest look-ahead accepted, in days.
pub const MAX_HORIZON_DAYS: u32 = 366;

/// Longest slot accepted. A slot never crosses a calendar date.
pub const MAX_SLOT_MINUTES: i64 = 24 * 60;

const DEFAULT_WINDOW_START: NaiveTime = match NaiveTime::from_hms_opt(7, 0, 0) {
    Some(t) => t,
    None => panic!("07:00 is a valid clock time"),
};

const DEFAULT_WINDOW_END: NaiveTime = match NaiveTime::from_hms_opt(22, 0, 0) {
    Some(t) => t,
    None => panic!("22:00 is a valid clock time"),
};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerConfig {
    /// Start of the default daily open window.
    pub window_start: NaiveTime,
    /// End of the default daily open window (exclusive).
    pub window_end: NaiveTime,
    /// Number of calendar days to look ahead, today included.
    pub horizon_days: u32,
    pub slot_minutes: i64,
    /// IANA zone used when neither the request nor the calendar names one.
    pub default_timezone: String,
    pub fallback_count: usize,
    pub max_ranked_candidates: usize,
    pub default_summary: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            window_start: DEFAULT_WINDOW_START,
            window_end: DEFAULT_WINDOW_END,
            horizon_days: 7,
            slot_minutes: 60,
            default_timezone: "UTC".to_string(),
            fallback_count: 5,
            max_ranked_candidates: 50,
            default_summary: "Meeting".to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Missing keys keep their
    /// default; malformed ones are logged and keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            window_start: parsed(&get, "SLOTS_WINDOW_START", defaults.window_start, parse_clock),
            window_end: parsed(&get, "SLOTS_WINDOW_END", defaults.window_end, parse_clock),
            horizon_days: parsed(&get, "SLOTS_HORIZON_DAYS", defaults.horizon_days, u32::from_str),
            slot_minutes: parsed(&get, "SLOTS_SLOT_MINUTES", defaults.slot_minutes, i64::from_str),
            default_timezone: get("SLOTS_DEFAULT_TIMEZONE").unwrap_or(defaults.default_timezone),
            fallback_count: parsed(&get, "SLOTS_FALLBACK_COUNT", defaults.fallback_count, usize::from_str),
            max_ranked_candidates: parsed(
                &get,
                "SLOTS_MAX_RANKED_CANDIDATES",
                defaults.max_ranked_candidates,
                usize::from_str,
            ),
            default_summary: get("SLOTS_DEFAULT_SUMMARY").unwrap_or(defaults.default_summary),
        }
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.base_window()?;
        if !(1..=MAX_HORIZON_DAYS).contains(&self.horizon_days) {
            return Err(SlotError::Configuration(format!(
                "horizon_days must be between 1 and {MAX_HORIZON_DAYS}, got {}",
                self.horizon_days
            )));
        }
        self.slot_duration()?;
        self.default_tz()?;
        Ok(())
    }

    pub fn base_window(&self) -> Result<ClockRange> {
        ClockRange::new(self.window_start, self.window_end)
            .map_err(|e| SlotError::Configuration(format!("base window: {e}")))
    }

    /// Fails with `Configuration` unless `slot_minutes` is in
    /// `1..=MAX_SLOT_MINUTES`.
    pub fn slot_duration(&self) -> Result<Duration> {
        if !(1..=MAX_SLOT_MINUTES).contains(&self.slot_minutes) {
            return Err(SlotError::Configuration(format!(
                "slot_minutes must be between 1 and {MAX_SLOT_MINUTES}, got {}",
                self.slot_minutes
            )));
        }
        Duration::try_minutes(self.slot_minutes)
            .ok_or_else(|| SlotError::Configuration(format!("slot_minutes {} is out of range", self.slot_minutes)))
    }

    pub fn default_tz(&self) -> Result<Tz> {
        self.default_timezone.parse().map_err(|_| {
            SlotError::Configuration(format!("default timezone '{}' is not an IANA zone", self.default_timezone))
        })
    }

    pub fn ranking_limits(&self) -> RankingLimits {
        RankingLimits {
            max_ranked_candidates: self.max_ranked_candidates,
            fallback_count: self.fallback_count,
        }
    }
}

fn parse_clock(raw: &str) -> chrono::ParseResult<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
}

fn parsed<T, E: std::fmt::Display>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    parse: impl Fn(&str) -> std::result::Result<T, E>,
) -> T {
    match get(key) {
        None => default,
        Some(raw) => parse(&raw).unwrap_or_else(|e| {
            warn!(key, value = %raw, error = %e, "ignoring malformed config value");
            default
        }),
    }
}
