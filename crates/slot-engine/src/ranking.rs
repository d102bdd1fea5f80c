//! Ranking candidate slots against free-text intent, and presenting the result.
//!
//! The ranker (an LLM behind [`SlotRanker`]) sees a day-balanced sample of the
//! candidates and answers with slot strings plus a message for the user. Its
//! answer is never trusted: anything that is not a byte-exact copy of a
//! generated candidate is dropped. If nothing survives, or the ranker fails,
//! the first candidates in chronological order are shown instead.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SlotError};
use crate::ports::SlotRanker;
use crate::slots::CandidateSlot;

/// Appended to the ranker's message when none of its picks were usable.
pub const FALLBACK_NOTE: &str =
    "(Note: I had trouble finding exact matches for your request, so here are the next available times.)";

/// Used when the ranker could not be reached at all.
pub const RANKER_UNAVAILABLE_MESSAGE: &str = "Here are the next available times.";

/// A slot as it crosses the ranker boundary: RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    pub start: String,
    pub end: String,
}

impl From<&CandidateSlot> for SlotRef {
    fn from(slot: &CandidateSlot) -> Self {
        Self {
            start: slot.start().to_rfc3339(),
            end: slot.end().to_rfc3339(),
        }
    }
}

/// What the ranker is asked.
#[derive(Debug, Clone, Copy)]
pub struct RankingRequest<'a> {
    pub candidates: &'a [CandidateSlot],
    pub user_text: Option<&'a str>,
    /// Owner preference: group meetings together where possible.
    pub batch_meetings: bool,
}

/// What the ranker answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSelection {
    #[serde(default)]
    pub slots: Vec<SlotRef>,
    #[serde(default)]
    pub message: String,
}

/// The final selection shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub slots: Vec<CandidateSlot>,
    pub message: String,
    /// True when the chronological fallback replaced the ranker's answer.
    pub used_fallback: bool,
}

/// Knobs for [`rank_and_present`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingLimits {
    /// Maximum number of candidates sent to the ranker.
    pub max_ranked_candidates: usize,
    /// Number of chronological candidates shown on fallback.
    pub fallback_count: usize,
}

/// Cap the candidate list at `cap`, sampling evenly per calendar day so later
/// days are not cut off. Each day contributes its first `max(1, cap / days)`
/// slots, days ascending.
pub fn sample_for_ranking(candidates: &[CandidateSlot], cap: usize) -> Vec<CandidateSlot> {
    if candidates.len() <= cap {
        return candidates.to_vec();
    }

    let mut by_day: BTreeMap<NaiveDate, Vec<CandidateSlot>> = BTreeMap::new();
    for slot in candidates {
        by_day.entry(slot.start().date_naive()).or_default().push(*slot);
    }

    let per_day = (cap / by_day.len()).max(1);
    by_day
        .into_values()
        .flat_map(|day| day.into_iter().take(per_day))
        .collect()
}

/// Keep only the ranker's picks that exactly match a generated candidate, in
/// the ranker's order, without repeats.
pub fn filter_to_candidates(selection: &RankedSelection, candidates: &[CandidateSlot]) -> Vec<CandidateSlot> {
    let known: BTreeMap<(String, String), CandidateSlot> = candidates
        .iter()
        .map(|c| {
            let r = SlotRef::from(c);
            ((r.start, r.end), *c)
        })
        .collect();

    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    for pick in &selection.slots {
        match known.get(&(pick.start.clone(), pick.end.clone())) {
            Some(slot) if seen.insert(*slot) => kept.push(*slot),
            Some(_) => {}
            None => warn!(start = %pick.start, end = %pick.end, "ranker returned a slot that was never offered"),
        }
    }
    kept
}

/// Rank `candidates` for `user_text` and produce what the user sees.
///
/// Ranker failure is recovered locally with the chronological fallback; only
/// an empty candidate list is an error.
pub fn rank_and_present(
    ranker: &dyn SlotRanker,
    candidates: &[CandidateSlot],
    user_text: Option<&str>,
    batch_meetings: bool,
    limits: RankingLimits,
) -> Result<Presentation> {
    if candidates.is_empty() {
        return Err(SlotError::NoAvailableSlots);
    }

    let sample = sample_for_ranking(candidates, limits.max_ranked_candidates);
    let request = RankingRequest {
        candidates: &sample,
        user_text,
        batch_meetings,
    };

    match ranker.rank_candidates(&request) {
        Ok(selection) => {
            let chosen = filter_to_candidates(&selection, candidates);
            if chosen.is_empty() {
                warn!(returned = selection.slots.len(), "no usable ranker picks; falling back to chronological slots");
                let message = format!("{} {}", selection.message.trim(), FALLBACK_NOTE);
                return Ok(fallback(candidates, limits.fallback_count, message.trim().to_string()));
            }
            Ok(Presentation {
                slots: chosen,
                message: selection.message,
                used_fallback: false,
            })
        }
        Err(e) => {
            warn!(error = %e, "ranker failed; falling back to chronological slots");
            Ok(fallback(
                candidates,
                limits.fallback_count,
                RANKER_UNAVAILABLE_MESSAGE.to_string(),
            ))
        }
    }
}

fn fallback(candidates: &[CandidateSlot], count: usize, message: String) -> Presentation {
    Presentation {
        slots: candidates.iter().take(count.max(1)).copied().collect(),
        message,
        used_fallback: true,
    }
}

/// Picks the earliest `count` candidates. Used when no AI ranker is configured.
#[derive(Debug, Clone, Copy)]
pub struct ChronologicalRanker {
    pub count: usize,
}

impl SlotRanker for ChronologicalRanker {
    fn rank_candidates(&self, request: &RankingRequest<'_>) -> Result<RankedSelection> {
        Ok(RankedSelection {
            slots: request.candidates.iter().take(self.count).map(SlotRef::from).collect(),
            message: "Here are the earliest available times.".to_string(),
        })
    }
}
