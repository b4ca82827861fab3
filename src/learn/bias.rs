//! Estimator for where in a range a player likes to pick numbers.
//!
//! `alpha` is the normalized position the player tends to favour: 0 is the
//! bottom of the range, 1 the top, 0.5 the middle. It is an exponential
//! moving average of observed positions:
//!
//! ```text
//! pos    = (choice - low) / (high - low)
//! alpha' = clamp(alpha + rate * (pos - alpha), 0, 1)
//! ```
//!
//! Prediction is deterministic interpolation. Any randomization lives in the
//! separate [`BiasEstimator::jitter`] step so that `alpha` alone fixes the
//! predicted number.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::learn::error::{check_learning_rate, LearnError};

/// Starting bias for a new profile (no preference).
pub const DEFAULT_ALPHA: f64 = 0.5;

/// Holds the bias parameter `alpha`, always in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BiasEstimator {
    alpha: f64,
}

impl Default for BiasEstimator {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl BiasEstimator {
    /// Create an estimator seeded with `alpha`, clamped into `[0, 1]`.
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_finite() { alpha } else { DEFAULT_ALPHA };
        Self {
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Current bias.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether the stored value satisfies `0 <= alpha <= 1`.
    pub fn is_valid(&self) -> bool {
        self.alpha.is_finite() && (0.0..=1.0).contains(&self.alpha)
    }

    /// Predict the player's number in `[low, high]` from the current bias.
    pub fn predict(&self, low: i64, high: i64) -> Result<i64, LearnError> {
        Self::interpolate(low, high, self.alpha)
    }

    /// `low + round(alpha * (high - low))`, rounding half away from zero.
    ///
    /// `alpha` is clamped into `[0, 1]` first, so the result always lies in
    /// `[low, high]`.
    pub fn interpolate(low: i64, high: i64, alpha: f64) -> Result<i64, LearnError> {
        if high < low {
            return Err(LearnError::invalid_input(
                "predict",
                format!("empty range [{}, {}]", low, high),
            ));
        }
        if low == high {
            return Ok(low);
        }

        let alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            DEFAULT_ALPHA
        };
        let offset = (alpha * span(low, high) as f64).round() as i128;
        Ok(clamp_to(low as i128 + offset, low, high))
    }

    /// Exploration step: shift `guess` by a uniform offset of at most
    /// `spread * (high - low)`, staying inside `[low, high]`.
    ///
    /// Kept apart from [`predict`](Self::predict) so the learned bias stays
    /// reproducible. A non-positive `spread` returns `guess` unchanged.
    pub fn jitter<R: Rng>(guess: i64, low: i64, high: i64, spread: f64, rng: &mut R) -> i64 {
        if high <= low {
            return low;
        }
        let guess = guess.clamp(low, high);
        if !spread.is_finite() || spread <= 0.0 {
            return guess;
        }

        let reach = (spread.min(1.0) * span(low, high) as f64).round() as i128;
        if reach == 0 {
            return guess;
        }
        let shifted = clamp_to(guess as i128 + rng.gen_range(-reach..=reach), low, high);
        trace!(guess, shifted, "reverse guess jittered");
        shifted
    }

    /// Move `alpha` toward the normalized position of `actual_choice`.
    pub fn update(
        &mut self,
        actual_choice: i64,
        low: i64,
        high: i64,
        learning_rate: f64,
    ) -> Result<(), LearnError> {
        if high <= low {
            return Err(LearnError::invalid_input(
                "bias update",
                format!("degenerate range [{}, {}]", low, high),
            ));
        }
        check_learning_rate("bias update", learning_rate)?;

        let position = (actual_choice as i128 - low as i128) as f64 / span(low, high) as f64;
        let raw = self.alpha + learning_rate * (position - self.alpha);
        let clamped = raw.clamp(0.0, 1.0);
        if clamped != raw {
            trace!(raw, clamped, "bias clamped");
        }

        debug!(
            old_alpha = self.alpha,
            new_alpha = clamped,
            position,
            "bias updated"
        );
        self.alpha = clamped;
        Ok(())
    }
}

/// Width of `[low, high]`. Widened so any pair of `i64` bounds fits.
fn span(low: i64, high: i64) -> i128 {
    high as i128 - low as i128
}

fn clamp_to(value: i128, low: i64, high: i64) -> i64 {
    // the clamp keeps the value inside i64
    value.clamp(low as i128, high as i128) as i64
}
