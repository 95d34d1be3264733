//! SRS (Spaced Repetition Scheduling) Module
//!
//! Two complementary memory-strength signals drive the scheduler:
//!
//! - **Short score**: mastery within the current learning cycle. Climbs by
//!   a fixed step on every sure answer and drops on a miss.
//! - **Long score**: durable retention. Only grows once the short score is
//!   full, and grows faster the longer the item went unreviewed relative
//!   to its expected due interval.
//!
//! ## Core Formulas:
//! - Short weight: `1 - short`
//! - Long weight: `step(days_since - 0.99 * days_end * long) * lerp(MIN_LONG_WEIGHT, 1, 1 - long)`
//! - Sampling weight: `short_coef * short_weight + long_coef * long_weight`
//!
//! Out-of-range values are reported, never clamped.

mod probability;
mod updater;

pub use probability::{estimate, Coefficients, ProbabilityData, ProbabilityRecord};
pub use updater::update_score;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Seconds in a day, as a float for day arithmetic
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fraction of the expected interval after which an item counts as due
pub const DUE_FACTOR: f64 = 0.99;

// ============================================================================
// MATH HELPERS
// ============================================================================

/// Linear interpolation from `a` (t = 0) to `b` (t = 1)
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Inverse of [`lerp`]: where `value` sits between `a` and `b`
#[inline]
pub fn inv_lerp(a: f64, b: f64, value: f64) -> f64 {
    (value - a) / (b - a)
}

/// Heaviside step: 1 for `x >= 0`, otherwise 0
#[inline]
pub fn unit_step(x: f64) -> f64 {
    if x >= 0.0 { 1.0 } else { 0.0 }
}

/// Fractional days from `from` to `to`, both in epoch seconds
#[inline]
pub fn days_between(from: i64, to: i64) -> f64 {
    (to - from) as f64 / SECONDS_PER_DAY
}

/// Report a value that must lie in [0, 1]. Returns whether it does.
///
/// Logged at error level and asserted in debug builds.
pub(crate) fn check_unit_interval(name: &str, item_id: u32, value: f64) -> bool {
    let ok = (0.0..=1.0).contains(&value);
    if !ok {
        tracing::error!(item_id, value, "{} outside [0, 1]", name);
    }
    debug_assert!(ok, "{} outside [0, 1] for item {}: {}", name, item_id, value);
    ok
}

// ============================================================================
// TESTS
// ============================================================================
