//! Score update law
//!
//! Computes the next short/long scores of an item after one answer.

use super::{check_unit_interval, days_between, lerp, DUE_FACTOR};
use crate::config::SrsParameters;
use crate::memory::{Certainty, ScoreRecord, ScoreUpdate};

/// Lowest long score granted once an item is first fully known short-term
const FIRST_LONG_SCORE: f64 = 0.01;

/// Upper bound of the time-prorated step completion
const MAX_STEP_COMPLETION: f64 = 2.0;

/// Compute the score update of one graded answer.
///
/// # Panics
///
/// Panics when `previous.short_score` is above 1 or NaN; stores only ever
/// hold scores produced by this function, so that state is unreachable.
pub fn update_score(
    previous: &ScoreRecord,
    min_last_asked: Option<i64>,
    certainty: Certainty,
    now: i64,
    params: &SrsParameters,
) -> ScoreUpdate {
    let id = previous.item_id;
    let prev_short = previous.short_score;
    let prev_long = previous.long_score;
    check_unit_interval("previous short score", id, prev_short);
    check_unit_interval("previous long score", id, prev_long);

    let short_score = match certainty {
        Certainty::Sure => (prev_short + params.step).min(1.0),
        Certainty::Maybe => (prev_short + params.step / 2.0).min(params.maybe_cap),
        Certainty::DontKnow => (prev_short - DUE_FACTOR * params.step).min(prev_long).max(0.0),
    };
    check_unit_interval("short score", id, short_score);

    let long_score = match certainty {
        Certainty::Maybe => prev_long / 2.0,
        Certainty::DontKnow => prev_long / lerp(4.0, 2.0, prev_long),
        Certainty::Sure if prev_short < 1.0 => {
            if short_score < 1.0 {
                prev_long
            } else {
                prev_long.max(FIRST_LONG_SCORE)
            }
        }
        Certainty::Sure if prev_short == 1.0 => {
            let days_since_asked = days_between(previous.last_asked, now);
            let days_end = min_last_asked.map_or(0.0, |min| days_between(min, now));
            let step_completion =
                step_completion(days_since_asked, DUE_FACTOR * days_end * prev_long);

            let prorated = prev_long.max(FIRST_LONG_SCORE) * lerp(1.0, 2.0, step_completion);
            prorated.min(prev_long + params.max_long_increment).min(1.0)
        }
        Certainty::Sure => panic!(
            "unreachable score state for item {}: short score {}",
            id, prev_short
        ),
    };
    check_unit_interval("long score", id, long_score);

    tracing::trace!(
        item_id = id,
        %certainty,
        prev_short,
        prev_long,
        short_score,
        long_score,
        "Score updated"
    );

    ScoreUpdate {
        item_id: id,
        short_score,
        long_score,
        last_asked: now,
        min_last_asked,
    }
}

/// How far the item got through its expected interval, capped at 2.
///
/// A zero expected interval (brand new domain, or long score 0) counts as
/// fully elapsed.
fn step_completion(days_since_asked: f64, expected_days: f64) -> f64 {
    if expected_days <= 0.0 {
        return MAX_STEP_COMPLETION;
    }
    (days_since_asked / expected_days).clamp(0.0, MAX_STEP_COMPLETION)
}

// ============================================================================
// TESTS
// ============================================================================
