//! Nearest-stop resolution.
//!
//! Photographic stops are multiplicative: each full stop doubles or halves the
//! light. Distance between a computed value and a scale entry is therefore
//! measured in stops, `|log2(candidate) - log2(target)|`, not linearly. A target
//! of 3.35 sits closer to f/2.8 on a ruler but closer to f/4 in stops, and f/4
//! is the answer.

use crate::catalog::StopScale;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("cannot resolve {0} to a stop: value must be a positive number")]
    NonPositiveTarget(f64),
    #[error("cannot resolve against an empty scale")]
    EmptyScale,
}

/// Snap `target` to the closest entry of `scale`, measured in stops.
pub fn resolve_nearest(scale: &StopScale, target: f64) -> Result<f64, ResolveError> {
    nearest_stop(scale.values(), target)
}

/// Slice form of [`resolve_nearest`].
///
/// Linear scan in the slice's order; on equal distance the earlier entry wins.
pub fn nearest_stop(values: &[f64], target: f64) -> Result<f64, ResolveError> {
    if !target.is_finite() || target <= 0.0 {
        return Err(ResolveError::NonPositiveTarget(target));
    }
    let log_target = target.log2();
    let (&first, rest) = values.split_first().ok_or(ResolveError::EmptyScale)?;

    let mut best = first;
    let mut best_distance = (first.log2() - log_target).abs();
    for &candidate in rest {
        let distance = (candidate.log2() - log_target).abs();
        if distance < best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    Ok(best)
}
