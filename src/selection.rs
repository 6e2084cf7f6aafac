//! Choosing which candidates end up in the slideshow.
//!
//! Remote candidates are drawn with a recency-weighted distribution, with
//! replacement, so one pin can appear more than once. Local candidates are
//! shuffled and truncated.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::seq::SliceRandom;

use crate::constants::{DEFAULT_IMAGE_CAP, SECONDS_PER_IMAGE};
use crate::error::{SlideshowError, SlideshowResult};

/// `weight(i) = r * (1 - i/N) + (1 - r)` for every rank `i` in `0..N`.
///
/// Rank 0 is the most recent candidate. With `r = 0` every weight is 1.
pub fn recency_weights(count: usize, recency_bias: f64) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let recency_score = 1.0 - (i as f64 / count as f64);
            recency_bias * recency_score + (1.0 - recency_bias)
        })
        .collect()
}

pub fn validate_recency_bias(recency_bias: f64) -> SlideshowResult<()> {
    if !recency_bias.is_finite() || !(0.0..=1.0).contains(&recency_bias) {
        return Err(SlideshowError::invalid_parameter(format!(
            "recency weight must be between 0 and 1, got {recency_bias}"
        )));
    }
    Ok(())
}

/// How many images to put in the slideshow.
///
/// An explicit request wins, then `duration / SECONDS_PER_IMAGE`, then
/// `min(DEFAULT_IMAGE_CAP, available)`.
pub fn image_count(
    requested: Option<i64>,
    duration_secs: Option<u64>,
    available: usize,
) -> SlideshowResult<usize> {
    let count = match (requested, duration_secs) {
        (Some(n), _) => n,
        (None, Some(secs)) => (secs / SECONDS_PER_IMAGE) as i64,
        (None, None) => DEFAULT_IMAGE_CAP.min(available) as i64,
    };
    if count <= 0 {
        return Err(SlideshowError::invalid_parameter(format!(
            "number of images must be positive, got {count}"
        )));
    }
    Ok(count as usize)
}

/// Draw `count` candidates with replacement, favouring the start of the list.
pub fn sample_with_replacement<T, R>(
    candidates: &[T],
    recency_bias: f64,
    count: usize,
    rng: &mut R,
) -> SlideshowResult<Vec<T>>
where
    T: Clone,
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        return Err(SlideshowError::empty_input("No candidates to select from"));
    }
    validate_recency_bias(recency_bias)?;
    if count == 0 {
        return Err(SlideshowError::invalid_parameter(
            "number of images must be positive, got 0",
        ));
    }

    let weights = recency_weights(candidates.len(), recency_bias);
    let distribution = WeightedIndex::new(&weights)
        .map_err(|e| SlideshowError::invalid_parameter(format!("invalid weights: {e}")))?;

    Ok((0..count)
        .map(|_| candidates[distribution.sample(rng)].clone())
        .collect())
}

/// Shuffle and keep the first `count` items (no duplicates).
pub fn shuffle_and_take<T, R>(mut candidates: Vec<T>, count: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates
}
