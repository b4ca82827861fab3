//! Hint styles and round outcomes shared by the learners.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How hints are presented to the player during a forward round.
///
/// The set is closed: the bandit keeps exactly one arm per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintStyle {
    /// Hot or cold, governed by the learned threshold `k`.
    HotCold,
    /// Plain higher/lower direction.
    HigherLower,
    /// Graded proximity bands (very close, warm, lukewarm, far).
    Range,
}

impl HintStyle {
    /// Every style, in declaration order.
    pub const ALL: [HintStyle; 3] = [HintStyle::HotCold, HintStyle::HigherLower, HintStyle::Range];

    /// Stable identifier, identical to the serialized form.
    pub fn key(&self) -> &'static str {
        match self {
            HintStyle::HotCold => "hot_cold",
            HintStyle::HigherLower => "higher_lower",
            HintStyle::Range => "range",
        }
    }
}

impl fmt::Display for HintStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Result of one completed (or abandoned) forward round.
///
/// Produced once per round, consumed by [`ThresholdLearner::update`] and
/// [`HintBandit::update`], then dropped.
///
/// [`ThresholdLearner::update`]: crate::learn::ThresholdLearner::update
/// [`HintBandit::update`]: crate::learn::HintBandit::update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Guesses made, including the final one.
    pub attempts_taken: u32,
    /// Whether the secret was found.
    pub solved: bool,
    /// Style shown during the round.
    pub style_used: HintStyle,
}

impl RoundOutcome {
    /// A round solved after `attempts_taken` guesses.
    pub fn solved(attempts_taken: u32, style_used: HintStyle) -> Self {
        Self {
            attempts_taken,
            solved: true,
            style_used,
        }
    }

    /// A round the player gave up on.
    pub fn abandoned(attempts_taken: u32, style_used: HintStyle) -> Self {
        Self {
            attempts_taken,
            solved: false,
            style_used,
        }
    }
}
