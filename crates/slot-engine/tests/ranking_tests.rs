//! Tests for ranking, the anti-hallucination filter and the fallback path.

use std::cell::RefCell;
use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveTime};
use slot_engine::ports::SlotRanker;
use slot_engine::ranking::{
    rank_and_present, sample_for_ranking, ChronologicalRanker, RankedSelection, RankingLimits, RankingRequest,
    SlotRef, FALLBACK_NOTE, RANKER_UNAVAILABLE_MESSAGE,
};
use slot_engine::window::{build_windows, ClockRange};
use slot_engine::{generate_slots, CandidateSlot, SlotError};

// ── Fakes ───────────────────────────────────────────────────────────────────

/// Answers with a fixed selection and remembers how many candidates it saw.
struct ScriptedRanker {
    answer: RankedSelection,
    seen: RefCell<Vec<CandidateSlot>>,
}

impl ScriptedRanker {
    fn new(slots: Vec<SlotRef>, message: &str) -> Self {
        Self {
            answer: RankedSelection {
                slots,
                message: message.to_string(),
            },
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl SlotRanker for ScriptedRanker {
    fn rank_candidates(&self, request: &RankingRequest<'_>) -> slot_engine::error::Result<RankedSelection> {
        *self.seen.borrow_mut() = request.candidates.to_vec();
        Ok(self.answer.clone())
    }
}

struct FailingRanker;

impl SlotRanker for FailingRanker {
    fn rank_candidates(&self, _request: &RankingRequest<'_>) -> slot_engine::error::Result<RankedSelection> {
        Err(SlotError::UpstreamUnavailable("model quota exceeded".to_string()))
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn limits() -> RankingLimits {
    RankingLimits {
        max_ranked_candidates: 50,
        fallback_count: 5,
    }
}

/// A week of hourly candidates (15 per day) starting Monday 2026-03-16, UTC.
fn week_of_candidates() -> Vec<CandidateSlot> {
    let base = ClockRange::new(
        NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
    )
    .unwrap();
    let windows = build_windows(base, &[], 7, NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());
    generate_slots(&windows, &[], &[], Duration::hours(1), chrono_tz::UTC)
}

fn slot_ref(start: &str, end: &str) -> SlotRef {
    SlotRef {
        start: start.to_string(),
        end: end.to_string(),
    }
}

// ── Filtering ───────────────────────────────────────────────────────────────

#[test]
fn valid_picks_are_kept_in_ranker_order() {
    let candidates = week_of_candidates();
    let ranker = ScriptedRanker::new(
        vec![SlotRef::from(&candidates[20]), SlotRef::from(&candidates[3])],
        "Two evening options.",
    );

    let shown = rank_and_present(&ranker, &candidates, Some("evenings please"), false, limits()).unwrap();

    assert_eq!(shown.slots, vec![candidates[20], candidates[3]]);
    assert_eq!(shown.message, "Two evening options.");
    assert!(!shown.used_fallback);
}

#[test]
fn slot_not_in_candidate_set_is_dropped() {
    let candidates = week_of_candidates();
    let ranker = ScriptedRanker::new(
        vec![
            slot_ref("2026-03-16T03:00:00+00:00", "2026-03-16T04:00:00+00:00"),
            SlotRef::from(&candidates[0]),
        ],
        "Early options.",
    );

    let shown = rank_and_present(&ranker, &candidates, None, false, limits()).unwrap();

    assert_eq!(shown.slots, vec![candidates[0]]);
}

#[test]
fn membership_is_byte_exact() {
    // Same instant, different spelling of the offset: not a generated candidate.
    let candidates = week_of_candidates();
    assert_eq!(SlotRef::from(&candidates[0]).start, "2026-03-16T07:00:00+00:00");
    let ranker = ScriptedRanker::new(
        vec![slot_ref("2026-03-16T07:00:00Z", "2026-03-16T08:00:00Z")],
        "Morning.",
    );

    let shown = rank_and_present(&ranker, &candidates, None, false, limits()).unwrap();

    assert!(shown.used_fallback);
}

#[test]
fn repeated_picks_are_shown_once() {
    let candidates = week_of_candidates();
    let pick = SlotRef::from(&candidates[5]);
    let ranker = ScriptedRanker::new(vec![pick.clone(), pick], "Twice.");

    let shown = rank_and_present(&ranker, &candidates, None, false, limits()).unwrap();

    assert_eq!(shown.slots, vec![candidates[5]]);
}

// ── Fallback ────────────────────────────────────────────────────────────────

#[test]
fn all_hallucinated_falls_back_to_first_candidates_with_note() {
    let candidates = week_of_candidates();
    let ranker = ScriptedRanker::new(
        vec![slot_ref("2030-01-01T10:00:00+00:00", "2030-01-01T11:00:00+00:00")],
        "Here you go.",
    );

    let shown = rank_and_present(&ranker, &candidates, Some("next decade"), false, limits()).unwrap();

    assert!(shown.used_fallback);
    assert_eq!(shown.slots, candidates[..5].to_vec());
    assert!(shown.message.starts_with("Here you go."));
    assert!(shown.message.ends_with(FALLBACK_NOTE));
}

#[test]
fn ranker_failure_falls_back_without_error() {
    let candidates = week_of_candidates();

    let shown = rank_and_present(&FailingRanker, &candidates, Some("anything"), false, limits()).unwrap();

    assert!(shown.used_fallback);
    assert_eq!(shown.slots.len(), 5);
    assert_eq!(shown.message, RANKER_UNAVAILABLE_MESSAGE);
}

#[test]
fn empty_candidate_set_is_an_error() {
    let err = rank_and_present(&FailingRanker, &[], None, false, limits()).unwrap_err();
    assert!(matches!(err, SlotError::NoAvailableSlots));
    assert!(err.is_client_facing());
}

// ── Sampling ────────────────────────────────────────────────────────────────

#[test]
fn ranker_sees_a_day_balanced_sample() {
    let candidates = week_of_candidates();
    assert_eq!(candidates.len(), 105);
    let ranker = ScriptedRanker::new(vec![SlotRef::from(&candidates[0])], "ok");

    rank_and_present(&ranker, &candidates, None, false, limits()).unwrap();

    let seen = ranker.seen.borrow();
    // 50 / 7 days = 7 per day.
    assert_eq!(seen.len(), 49);
    let days: BTreeSet<NaiveDate> = seen.iter().map(|s| s.start().date_naive()).collect();
    assert_eq!(days.len(), 7, "later days are not cut off");
}

#[test]
fn small_candidate_sets_are_not_sampled() {
    let candidates: Vec<CandidateSlot> = week_of_candidates().into_iter().take(10).collect();
    assert_eq!(sample_for_ranking(&candidates, 50), candidates);
}

#[test]
fn sampling_keeps_at_least_one_per_day() {
    let candidates = week_of_candidates();
    let sample = sample_for_ranking(&candidates, 3);
    assert_eq!(sample.len(), 7);
}

#[test]
fn chronological_ranker_picks_earliest() {
    let candidates = week_of_candidates();
    let ranker = ChronologicalRanker { count: 3 };

    let shown = rank_and_present(&ranker, &candidates, None, false, limits()).unwrap();

    assert_eq!(shown.slots, candidates[..3].to_vec());
    assert!(!shown.used_fallback);
}
