//! Forgetting probability estimation
//!
//! Turns the score records of every enabled item into a sampling weight.
//! Short-term and long-term weights are mixed with load-balancing
//! coefficients so that freshly introduced items and long-neglected ones
//! both stay competitive, with the short-term share growing with the
//! number of items still unmastered.

use serde::{Deserialize, Serialize};

use super::{check_unit_interval, days_between, inv_lerp, lerp, unit_step, DUE_FACTOR};
use crate::config::SrsParameters;
use crate::memory::ScoreRecord;

// ============================================================================
// TYPES
// ============================================================================

/// Per-item intermediate values of one scheduling round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityRecord {
    pub item_id: u32,
    pub short_score: f64,
    pub short_weight: f64,
    pub long_score: f64,
    pub long_weight: f64,
    pub last_asked: i64,
    pub days_since_asked: f64,
    /// Sampling weight; not normalized
    pub final_probability: f64,
}

/// Batch statistics and the coefficients derived from them
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coefficients {
    pub item_count: usize,
    pub count_unknown: usize,
    pub total_short_weight: f64,
    pub total_long_weight: f64,
    /// Days since the domain was first studied
    pub days_end: f64,
    pub min_proba_short: f64,
    pub needed_short_weight: f64,
    pub short_coefficient: f64,
    pub long_coefficient: f64,
    /// Whether the fixed fallback coefficients were used
    pub degenerate: bool,
}

/// Output of [`estimate`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityData {
    pub records: Vec<ProbabilityRecord>,
    pub coefficients: Coefficients,
}

impl ProbabilityData {
    /// Sum of all sampling weights
    pub fn total_weight(&self) -> f64 {
        self.records.iter().map(|r| r.final_probability).sum()
    }

    /// Look up the record of one item
    pub fn get(&self, item_id: u32) -> Option<&ProbabilityRecord> {
        self.records.iter().find(|r| r.item_id == item_id)
    }

    /// Item ids in record order
    pub fn item_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.records.iter().map(|r| r.item_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// ESTIMATION
// ============================================================================

/// Compute the sampling weight of every record.
///
/// `min_last_asked` is the smallest non-zero `last_asked` of the domain;
/// `None` when nothing was ever asked, in which case `days_end` is 0.
pub fn estimate(
    records: &[ScoreRecord],
    min_last_asked: Option<i64>,
    now: i64,
    params: &SrsParameters,
) -> ProbabilityData {
    if records.is_empty() {
        return ProbabilityData::default();
    }

    let days_end = min_last_asked.map_or(0.0, |min| days_between(min, now));

    let mut out: Vec<ProbabilityRecord> = records
        .iter()
        .map(|record| weigh(record, days_end, now, params))
        .collect();

    let coefficients = coefficients(records, &out, days_end, params);

    for record in &mut out {
        record.final_probability = coefficients.short_coefficient * record.short_weight
            + coefficients.long_coefficient * record.long_weight;

        let valid = record.final_probability >= 0.0 && record.final_probability.is_finite();
        if !valid {
            tracing::error!(
                item_id = record.item_id,
                value = record.final_probability,
                "final probability is negative or not finite"
            );
        }
        debug_assert!(
            valid,
            "final probability {} for item {}",
            record.final_probability,
            record.item_id
        );
    }

    ProbabilityData {
        records: out,
        coefficients,
    }
}

/// Stage one: short and long weights of a single item
fn weigh(
    record: &ScoreRecord,
    days_end: f64,
    now: i64,
    params: &SrsParameters,
) -> ProbabilityRecord {
    let short_weight = 1.0 - record.short_score;
    check_unit_interval("short weight", record.item_id, short_weight);

    let days_since_asked = days_between(record.last_asked, now);

    // Long-term standing only matters once the item is known short-term
    let long_weight = if short_weight != 0.0 {
        0.0
    } else {
        let due = unit_step(days_since_asked - DUE_FACTOR * days_end * record.long_score);
        due * lerp(params.min_long_weight, 1.0, 1.0 - record.long_score)
    };
    check_unit_interval("long weight", record.item_id, long_weight);

    ProbabilityRecord {
        item_id: record.item_id,
        short_score: record.short_score,
        short_weight,
        long_score: record.long_score,
        long_weight,
        last_asked: record.last_asked,
        days_since_asked,
        final_probability: 0.0,
    }
}

/// Stage two: derive the short/long mix from batch statistics
fn coefficients(
    records: &[ScoreRecord],
    weighted: &[ProbabilityRecord],
    days_end: f64,
    params: &SrsParameters,
) -> Coefficients {
    let item_count = records.len();
    let total_short_weight: f64 = weighted.iter().map(|r| r.short_weight).sum();
    let total_long_weight: f64 = weighted.iter().map(|r| r.long_weight).sum();
    let count_unknown = records.iter().filter(|r| r.short_score < 1.0).count();

    let unknown_ratio = count_unknown as f64 / item_count as f64;
    let min_proba_coeff =
        inv_lerp(params.min_ratio, params.max_ratio, unknown_ratio).clamp(0.0, 1.0);
    let min_proba_short = lerp(
        params.min_proba_short_unknown,
        params.max_proba_short_unknown,
        min_proba_coeff,
    );

    let mut coefficients = Coefficients {
        item_count,
        count_unknown,
        total_short_weight,
        total_long_weight,
        days_end,
        min_proba_short,
        ..Coefficients::default()
    };

    if total_short_weight == 0.0 || total_long_weight == 0.0 {
        coefficients.needed_short_weight = min_proba_short;
        coefficients.short_coefficient = 1.0;
        coefficients.long_coefficient = 1.0;
        coefficients.degenerate = true;
        return coefficients;
    }

    let saturation = (count_unknown as f64 / params.max_count_short_unknown).min(1.0);
    let needed_short_weight = lerp(min_proba_short, params.max_proba_short_unknown, saturation);

    coefficients.needed_short_weight = needed_short_weight;
    coefficients.short_coefficient =
        needed_short_weight * (total_short_weight + total_long_weight) / total_short_weight;
    coefficients.long_coefficient = 1.0;
    coefficients
}

// ============================================================================
// TESTS
// ============================================================================
