//! Online estimator for the hot/cold proximity threshold.
//!
//! A guess is "hot" when its distance to the secret is below `k` times the
//! size of the active search window. After each solved round `k` is nudged
//! proportionally to how far the attempt count landed from the target:
//!
//! ```text
//! k' = clamp(k + rate * (attempts - target) / target, MIN_K, 1)
//! ```
//!
//! A struggling player gets a wider hot zone; a fast one gets a tighter zone.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::learn::error::{check_learning_rate, LearnError};
use crate::learn::outcome::RoundOutcome;

/// Smallest value `k` may take after clamping.
pub const MIN_K: f64 = 0.001;

/// Largest value `k` may take after clamping.
pub const MAX_K: f64 = 1.0;

/// Starting threshold for a new profile.
pub const DEFAULT_K: f64 = 0.1;

/// Proximity classification of a single guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    /// Closer than `k * range_size`.
    Hot,
    /// At or beyond `k * range_size`.
    Cold,
}

/// Holds the threshold multiplier `k`, always in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdLearner {
    k: f64,
}

impl Default for ThresholdLearner {
    fn default() -> Self {
        Self { k: DEFAULT_K }
    }
}

impl ThresholdLearner {
    /// Create a learner seeded with `k`, clamped into `[MIN_K, MAX_K]`.
    pub fn new(k: f64) -> Self {
        let k = if k.is_finite() { k } else { DEFAULT_K };
        Self {
            k: k.clamp(MIN_K, MAX_K),
        }
    }

    /// Current threshold multiplier.
    pub fn k(&self) -> f64 {
        self.k
    }

    /// Whether the stored value satisfies `0 < k <= 1`.
    pub fn is_valid(&self) -> bool {
        self.k.is_finite() && self.k > 0.0 && self.k <= MAX_K
    }

    /// Classify a guess `distance` away from the secret within a window of
    /// `range_size` numbers.
    pub fn classify(&self, distance: f64, range_size: f64) -> Result<Proximity, LearnError> {
        if !range_size.is_finite() || range_size <= 0.0 {
            return Err(LearnError::invalid_input(
                "classify",
                format!("range_size {} must be positive", range_size),
            ));
        }
        if !distance.is_finite() || distance < 0.0 {
            return Err(LearnError::invalid_input(
                "classify",
                format!("distance {} must be non-negative", distance),
            ));
        }

        if distance < self.k * range_size {
            Ok(Proximity::Hot)
        } else {
            Ok(Proximity::Cold)
        }
    }

    /// Adapt `k` toward the target solve speed.
    ///
    /// Unsolved rounds carry no speed signal and leave `k` untouched.
    pub fn update(
        &mut self,
        outcome: &RoundOutcome,
        target_attempts: u32,
        learning_rate: f64,
    ) -> Result<(), LearnError> {
        if target_attempts == 0 {
            return Err(LearnError::invalid_input(
                "threshold update",
                "target_attempts must be at least 1",
            ));
        }
        if outcome.attempts_taken == 0 {
            return Err(LearnError::invalid_input(
                "threshold update",
                "attempts_taken must be at least 1",
            ));
        }
        check_learning_rate("threshold update", learning_rate)?;

        if !outcome.solved {
            return Ok(());
        }

        let target = target_attempts as f64;
        let error = (outcome.attempts_taken as f64 - target) / target;
        let raw = self.k + learning_rate * error;
        let clamped = raw.clamp(MIN_K, MAX_K);
        if clamped != raw {
            trace!(raw, clamped, "threshold clamped");
        }

        debug!(
            old_k = self.k,
            new_k = clamped,
            attempts = outcome.attempts_taken,
            target = target_attempts,
            "threshold updated"
        );
        self.k = clamped;
        Ok(())
    }
}
