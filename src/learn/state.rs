//! Per-player learning state, persisted between sessions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::learn::bandit::{HintBandit, HintStats};
use crate::learn::bias::BiasEstimator;
use crate::learn::config::LearnerConfig;
use crate::learn::error::LearnError;
use crate::learn::outcome::RoundOutcome;
use crate::learn::threshold::ThresholdLearner;

/// Default upper bound of the forward-mode number range.
pub const DEFAULT_RANGE_SIZE: u32 = 100;
/// Smallest range the difficulty adaptation may shrink to.
pub const MIN_RANGE_SIZE: u32 = 10;
/// Largest range the difficulty adaptation may grow to.
pub const MAX_RANGE_SIZE: u32 = 10_000;

/// Smoothing weight of the newest round in `avg_attempts`.
const AVG_ATTEMPTS_WEIGHT: f64 = 0.2;
/// Grow the range while the average stays below this.
const GROW_BELOW: f64 = 4.0;
/// Shrink the range while the average stays above this.
const SHRINK_ABOVE: f64 = 8.0;

/// Everything the engine remembers about one player.
///
/// Serialized with the learners flattened to their scalar form:
///
/// ```json
/// {
///   "username": "ada",
///   "games_played": 2,
///   "total_attempts": 9,
///   "k": 0.125,
///   "alpha": 0.48,
///   "hint_stats": { "hot_cold": { "pulls": 2, "reward_sum": 0.45 }, ... },
///   "avg_attempts": 4.4,
///   "range_size": 100
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerState {
    /// Profile identifier.
    pub username: String,
    /// Solved forward rounds.
    pub games_played: u64,
    /// Attempts summed over solved forward rounds.
    pub total_attempts: u64,
    /// Hot/cold threshold learner.
    #[serde(rename = "k", default)]
    pub threshold: ThresholdLearner,
    /// Number-picking bias estimator.
    #[serde(rename = "alpha", default)]
    pub bias: BiasEstimator,
    /// Hint style bandit.
    #[serde(rename = "hint_stats", default)]
    pub bandit: HintBandit,
    /// Smoothed attempts per solved round, absent before the first solve.
    #[serde(default)]
    pub avg_attempts: Option<f64>,
    /// Forward-mode numbers are drawn from `[1, range_size]`.
    #[serde(default = "default_range_size")]
    pub range_size: u32,
}

fn default_range_size() -> u32 {
    DEFAULT_RANGE_SIZE
}

impl LearnerState {
    /// Fresh state for a player seen for the first time.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            games_played: 0,
            total_attempts: 0,
            threshold: ThresholdLearner::default(),
            bias: BiasEstimator::default(),
            bandit: HintBandit::default(),
            avg_attempts: None,
            range_size: DEFAULT_RANGE_SIZE,
        }
    }

    /// Hint statistics.
    pub fn hint_stats(&self) -> &HintStats {
        self.bandit.stats()
    }

    /// Apply a finished forward round to every round-level learner.
    ///
    /// Either all of the threshold, bandit and counters change, or none do.
    pub fn record_round(
        &mut self,
        outcome: &RoundOutcome,
        config: &LearnerConfig,
    ) -> Result<(), LearnError> {
        let mut threshold = self.threshold;
        let mut bandit = self.bandit;
        threshold.update(
            outcome,
            config.target_attempts,
            config.threshold_learning_rate,
        )?;
        bandit.update(outcome)?;

        self.threshold = threshold;
        self.bandit = bandit;
        if outcome.solved {
            self.record_solve(outcome.attempts_taken);
        }
        Ok(())
    }

    /// Update counters, the attempts average and the range size.
    fn record_solve(&mut self, attempts: u32) {
        self.games_played += 1;
        self.total_attempts += attempts as u64;

        let avg = match self.avg_attempts {
            None => attempts as f64,
            Some(prev) => (1.0 - AVG_ATTEMPTS_WEIGHT) * prev + AVG_ATTEMPTS_WEIGHT * attempts as f64,
        };
        self.avg_attempts = Some(avg);

        let old_range = self.range_size;
        if avg < GROW_BELOW {
            self.range_size = ((self.range_size as f64 * 1.2) as u32).min(MAX_RANGE_SIZE);
        } else if avg > SHRINK_ABOVE {
            self.range_size = ((self.range_size as f64 * 0.8) as u32).max(MIN_RANGE_SIZE);
        }
        if old_range != self.range_size {
            debug!(
                user = %self.username,
                old_range,
                new_range = self.range_size,
                avg_attempts = avg,
                "range size adapted"
            );
        }
    }

    /// Check every persisted invariant, describing the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username is empty".to_string());
        }
        if self.total_attempts < self.games_played {
            return Err(format!(
                "total_attempts {} is below games_played {}",
                self.total_attempts, self.games_played
            ));
        }
        if !self.threshold.is_valid() {
            return Err(format!("k {} is outside (0, 1]", self.threshold.k()));
        }
        if !self.bias.is_valid() {
            return Err(format!("alpha {} is outside [0, 1]", self.bias.alpha()));
        }
        if !self.bandit.is_valid() {
            return Err("hint_stats holds a reward sum no sequence of rounds could produce".to_string());
        }
        if !(MIN_RANGE_SIZE..=MAX_RANGE_SIZE).contains(&self.range_size) {
            return Err(format!(
                "range_size {} is outside [{}, {}]",
                self.range_size, MIN_RANGE_SIZE, MAX_RANGE_SIZE
            ));
        }
        if let Some(avg) = self.avg_attempts {
            if !avg.is_finite() || avg < 1.0 {
                return Err(format!("avg_attempts {} is not a valid average", avg));
            }
        }
        Ok(())
    }
}
