//! Epsilon-greedy bandit over hint presentation styles.
//!
//! Each [`HintStyle`] is an arm. A solved round pays `1 / attempts_taken`
//! to the arm that was used, so styles that lead to quicker solves accumulate
//! a higher average reward.
//!
//! # Selection
//!
//! ```text
//! with probability epsilon      -> uniform random style   (explore)
//! otherwise                     -> best average reward    (exploit)
//! no arm pulled yet             -> uniform random style   (cold start)
//! several arms tied for best    -> uniform among the tied arms
//! ```
//!
//! Untried arms never take part in exploitation; they are reached only through
//! exploration or the cold-start rule.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::learn::error::LearnError;
use crate::learn::outcome::{HintStyle, RoundOutcome};

/// Tolerance when comparing average rewards for ties.
const TIE_TOLERANCE: f64 = 1e-12;

/// Relative slack on the reward-sum bound for accumulated rounding.
const SUM_TOLERANCE: f64 = 1e-9;

/// Pull count and cumulative reward for one arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmStats {
    /// Number of solved rounds credited to this arm.
    pub pulls: u32,
    /// Sum of rewards from those rounds.
    pub reward_sum: f64,
}

impl ArmStats {
    /// Average reward, or `None` if the arm is untried.
    pub fn average(&self) -> Option<f64> {
        if self.pulls > 0 {
            Some(self.reward_sum / self.pulls as f64)
        } else {
            None
        }
    }

    /// Every reward is in `(0, 1]`, so the sum is zero for an untried arm
    /// and never exceeds the pull count.
    fn is_valid(&self) -> bool {
        if !self.reward_sum.is_finite() || self.reward_sum < 0.0 {
            return false;
        }
        if self.pulls == 0 {
            return self.reward_sum == 0.0;
        }
        let pulls = self.pulls as f64;
        self.reward_sum > 0.0 && self.reward_sum <= pulls * (1.0 + SUM_TOLERANCE)
    }
}

/// Per-style statistics, one field per [`HintStyle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HintStats {
    /// Statistics for [`HintStyle::HotCold`].
    pub hot_cold: ArmStats,
    /// Statistics for [`HintStyle::HigherLower`].
    pub higher_lower: ArmStats,
    /// Statistics for [`HintStyle::Range`].
    pub range: ArmStats,
}

impl HintStats {
    /// Statistics for one style.
    pub fn get(&self, style: HintStyle) -> &ArmStats {
        match style {
            HintStyle::HotCold => &self.hot_cold,
            HintStyle::HigherLower => &self.higher_lower,
            HintStyle::Range => &self.range,
        }
    }

    /// Mutable statistics for one style.
    pub fn get_mut(&mut self, style: HintStyle) -> &mut ArmStats {
        match style {
            HintStyle::HotCold => &mut self.hot_cold,
            HintStyle::HigherLower => &mut self.higher_lower,
            HintStyle::Range => &mut self.range,
        }
    }

    /// Iterate `(style, stats)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (HintStyle, &ArmStats)> + '_ {
        HintStyle::ALL.into_iter().map(move |style| (style, self.get(style)))
    }

    /// Total pulls across all arms.
    pub fn total_pulls(&self) -> u64 {
        self.iter().map(|(_, arm)| arm.pulls as u64).sum()
    }
}

/// Bandit state: the statistics of every arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HintBandit {
    stats: HintStats,
}

impl HintBandit {
    /// Create a bandit with every arm untried.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bandit from existing statistics.
    pub fn from_stats(stats: HintStats) -> Self {
        Self { stats }
    }

    /// Arm statistics.
    pub fn stats(&self) -> &HintStats {
        &self.stats
    }

    /// Whether every arm's reward sum is one that solved rounds could produce.
    pub fn is_valid(&self) -> bool {
        self.stats.iter().all(|(_, arm)| arm.is_valid())
    }

    /// Pick a style for the next round.
    ///
    /// `epsilon` outside `[0, 1]` behaves as its nearest bound.
    pub fn select<R: Rng>(&self, epsilon: f64, rng: &mut R) -> HintStyle {
        if rng.gen::<f64>() < epsilon {
            return Self::random_style(&HintStyle::ALL, rng);
        }

        let best = self.best_arms();
        if best.is_empty() {
            Self::random_style(&HintStyle::ALL, rng)
        } else {
            Self::random_style(&best, rng)
        }
    }

    /// Pulled arms sharing the highest average reward.
    pub fn best_arms(&self) -> Vec<HintStyle> {
        let mut best: Vec<HintStyle> = Vec::with_capacity(HintStyle::ALL.len());
        let mut best_avg = f64::NEG_INFINITY;

        for (style, arm) in self.stats.iter() {
            let Some(avg) = arm.average() else {
                continue;
            };
            if avg > best_avg + TIE_TOLERANCE {
                best.clear();
                best.push(style);
                best_avg = avg;
            } else if (avg - best_avg).abs() <= TIE_TOLERANCE {
                best.push(style);
            }
        }

        best
    }

    /// Reward earned by a round: `1 / attempts_taken` when solved.
    pub fn reward(outcome: &RoundOutcome) -> Option<f64> {
        if outcome.solved && outcome.attempts_taken > 0 {
            Some(1.0 / outcome.attempts_taken as f64)
        } else {
            None
        }
    }

    /// Credit the style used by `outcome`. Unsolved rounds are skipped.
    pub fn update(&mut self, outcome: &RoundOutcome) -> Result<(), LearnError> {
        if outcome.attempts_taken == 0 {
            return Err(LearnError::invalid_input(
                "bandit update",
                "attempts_taken must be at least 1",
            ));
        }

        let Some(reward) = Self::reward(outcome) else {
            return Ok(());
        };

        let arm = self.stats.get_mut(outcome.style_used);
        arm.pulls = arm.pulls.saturating_add(1);
        arm.reward_sum += reward;

        debug!(
            style = %outcome.style_used,
            reward,
            pulls = arm.pulls,
            "bandit arm updated"
        );
        Ok(())
    }

    fn random_style<R: Rng>(choices: &[HintStyle], rng: &mut R) -> HintStyle {
        // Callers never pass an empty slice; fall back to the first style regardless.
        choices.choose(rng).copied().unwrap_or(HintStyle::HotCold)
    }
}
