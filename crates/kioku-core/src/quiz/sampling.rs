//! Random sampling primitives used by the quiz engine

use rand::seq::SliceRandom;
use rand::Rng;

/// Pick an index with probability proportional to its weight.
///
/// Draws `r = uniform[0, 1) * Σw` and returns the first index whose
/// cumulative weight reaches `r`, or the last index if rounding leaves
/// `r` unreached. When every weight is zero the pick is uniform.
/// Returns `None` only for an empty slice.
pub fn weighted_pick<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Some(rng.gen_range(0..weights.len()));
    }

    let r = rng.gen_range(0.0..1.0) * total;
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if cumulative >= r && *weight > 0.0 {
            return Some(index);
        }
    }
    Some(weights.len() - 1)
}

/// Uniformly sample `count` distinct elements (all of them if fewer)
pub fn sample_distinct<R: Rng + ?Sized, T: Copy>(rng: &mut R, pool: &[T], count: usize) -> Vec<T> {
    pool.choose_multiple(rng, count).copied().collect()
}

// ============================================================================
// TESTS
// ============================================================================
