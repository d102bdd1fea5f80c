//! `slots` CLI: list, rank, check and book meeting slots from the command line.
//!
//! The calendar is a JSON export (a bare event array or an events list
//! response); preferences are the owner's `{"no_meetings": [...]}` document.
//!
//! ## Usage
//!
//! ```sh
//! # Candidate slots for the next 7 days, in the calendar's zone
//! slots --events calendar.json --preferences preferences.json candidates
//!
//! # Deterministic run in a given zone, 3-day horizon, first 5 slots
//! slots --events calendar.json --timezone Europe/Berlin \
//!   --now 2026-03-16T09:00:00+01:00 candidates --horizon 3 --limit 5
//!
//! # Rank with a recorded ranker answer (unknown slots are dropped)
//! slots --events calendar.json present --text "weekend mornings" --ranked answer.json
//!
//! # Is an interval blocked by a preference rule?
//! slots --preferences preferences.json check --start 2026-03-16T12:00:00Z --end 2026-03-16T13:00:00Z
//!
//! # Validate against the live file and append the booking to it
//! slots --events calendar.json --preferences preferences.json \
//!   book --start 2026-03-21T10:00:00Z --end 2026-03-21T11:00:00Z --email guest@example.com
//! ```
//!
//! Scheduler tunables come from `SLOTS_*` environment variables (or `.env`).
//! Logs go to stderr; set `RUST_LOG=debug` for detail.

mod files;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::Serialize;
use slot_engine::config::load_dotenv;
use slot_engine::ports::{Clock, FixedClock, PreferenceSource, SlotRanker, SystemClock};
use slot_engine::ranking::{ChronologicalRanker, SlotRef};
use slot_engine::rules::blocking_rule;
use slot_engine::{BookingRequest, Collaborators, Scheduler, SchedulerConfig, TimeInterval};
use tracing_subscriber::EnvFilter;

use crate::files::{JsonFileCalendar, JsonFilePreferences, RecordedRanker};

#[derive(Parser)]
#[command(name = "slots", version, about = "Meeting slot suggestions and bookings against a calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Calendar events JSON file (missing file means an empty calendar)
    #[arg(long, global = true, default_value = "calendar.json", env = "SLOTS_EVENTS_FILE")]
    events: PathBuf,

    /// Preferences JSON file with blocking rules
    #[arg(long, global = true, env = "SLOTS_PREFERENCES_FILE")]
    preferences: Option<PathBuf>,

    /// IANA timezone for the request (falls back to the calendar's zone, then the default)
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Pretend the current time is this RFC 3339 instant
    #[arg(long, global = true)]
    now: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List candidate slots as JSON
    Candidates {
        /// Look-ahead in calendar days, today included
        #[arg(long)]
        horizon: Option<u32>,
        /// Print at most this many slots
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rank candidates for a free-text request and print the selection
    Present {
        /// What the attendee is looking for
        #[arg(long)]
        text: Option<String>,
        /// Recorded ranker answer to replay (defaults to earliest slots)
        #[arg(long)]
        ranked: Option<PathBuf>,
    },
    /// Report whether an interval is blocked by a preference rule
    Check {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Validate a slot against the calendar and rules, then book it
    Book {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Attendee email address
        #[arg(long)]
        email: Option<String>,
        /// Event title
        #[arg(long)]
        summary: Option<String>,
    },
}

#[derive(Serialize)]
struct PresentationOutput {
    slots: Vec<SlotRef>,
    message: String,
    used_fallback: bool,
}

#[derive(Serialize)]
struct CheckOutput {
    blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

#[derive(Serialize)]
struct BookingOutput {
    event_id: String,
    start: String,
    end: String,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attendee_email: Option<String>,
    conference_request_id: String,
}

fn main() -> Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SchedulerConfig::from_env();

    let calendar = JsonFileCalendar::new(&cli.events);
    let preferences = JsonFilePreferences::new(cli.preferences.clone());
    let clock: Box<dyn Clock> = match cli.now.as_deref() {
        Some(raw) => Box::new(FixedClock(parse_instant(raw)?.with_timezone(&Utc))),
        None => Box::new(SystemClock),
    };
    let ranker: Box<dyn SlotRanker> = match &cli.command {
        Commands::Present { ranked: Some(path), .. } => Box::new(
            RecordedRanker::load(path).with_context(|| format!("Failed to load ranker answer: {}", path.display()))?,
        ),
        _ => Box::new(ChronologicalRanker {
            count: config.fallback_count,
        }),
    };

    let scheduler = Scheduler::new(
        Collaborators {
            calendar: &calendar,
            writer: &calendar,
            preferences: &preferences,
            ranker: ranker.as_ref(),
            clock: clock.as_ref(),
        },
        config,
    )
    .context("Invalid scheduler configuration")?;
    let timezone = cli.timezone.as_deref();

    match cli.command {
        Commands::Candidates { horizon, limit } => {
            let slots = scheduler.list_candidate_slots(timezone, horizon)?;
            let shown: Vec<SlotRef> = slots
                .iter()
                .take(limit.unwrap_or(usize::MAX))
                .map(SlotRef::from)
                .collect();
            print_json(&shown)?;
        }
        Commands::Present { text, .. } => {
            let slots = scheduler.list_candidate_slots(timezone, None)?;
            let shown = scheduler.rank_and_present(&slots, text.as_deref())?;
            print_json(&PresentationOutput {
                slots: shown.slots.iter().map(SlotRef::from).collect(),
                message: shown.message,
                used_fallback: shown.used_fallback,
            })?;
        }
        Commands::Check { start, end } => {
            let tz = scheduler.resolve_timezone(timezone)?;
            let interval = parse_interval(&start, &end, tz)?;
            let rules = preferences.fetch_preference_rules()?;
            let rule = blocking_rule(&interval, &rules);
            print_json(&CheckOutput {
                blocked: rule.is_some(),
                reason: rule.and_then(|r| r.reason.clone()),
            })?;
        }
        Commands::Book {
            start,
            end,
            email,
            summary,
        } => {
            let tz = scheduler.resolve_timezone(timezone)?;
            let request = BookingRequest {
                slot: parse_interval(&start, &end, tz)?,
                attendee_email: email,
                summary,
            };
            let record = scheduler.book_slot(&request)?;
            print_json(&BookingOutput {
                event_id: record.event_id,
                start: record.slot.start().to_rfc3339(),
                end: record.slot.end().to_rfc3339(),
                summary: record.summary,
                attendee_email: record.attendee_email,
                conference_request_id: record.conference_request_id.to_string(),
            })?;
        }
    }

    Ok(())
}

fn parse_instant(raw: &str) -> Result<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).with_context(|| format!("Invalid RFC 3339 datetime: '{}'", raw))
}

/// Parse an interval and re-express it in the request zone, so rule weekdays
/// and clock times are read in that zone.
fn parse_interval(start: &str, end: &str, tz: Tz) -> Result<TimeInterval> {
    let start = parse_instant(start)?.with_timezone(&tz);
    let end = parse_instant(end)?.with_timezone(&tz);
    Ok(TimeInterval::new(start, end)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
