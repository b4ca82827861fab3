//! Hint construction for the forward game mode.
//!
//! A hint is computed from the guess, the secret and the active search window
//! `[cur_lo, cur_hi]`; only the [`HintStyle::HotCold`] variant consults the
//! learned threshold.

use std::fmt;

use crate::learn::{HintStyle, LearnError, Proximity, ThresholdLearner};

/// Fixed proximity bands used by [`HintStyle::Range`], as fractions of the window.
const VERY_CLOSE: f64 = 0.1;
const WARM: f64 = 0.3;
const LUKEWARM: f64 = 0.5;

/// Direction from a guess to the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The secret is larger.
    Higher,
    /// The secret is smaller.
    Lower,
}

/// Graded proximity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Band {
    /// Under 10% of the window away.
    VeryClose,
    /// Under 30%.
    Warm,
    /// Under 50%.
    Lukewarm,
    /// Half the window or more.
    Far,
}

impl Band {
    /// Largest distance, as a fraction of the window, this band can mean.
    pub fn max_fraction(&self) -> f64 {
        match self {
            Band::VeryClose => VERY_CLOSE,
            Band::Warm => WARM,
            Band::Lukewarm => LUKEWARM,
            Band::Far => 1.0,
        }
    }
}

/// A hint as shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// Hot/cold classification.
    Temperature(Proximity),
    /// Higher/lower direction.
    Direction(Direction),
    /// Graded proximity.
    Range(Band),
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Hint::Temperature(Proximity::Hot) => "HOT!",
            Hint::Temperature(Proximity::Cold) => "COLD!",
            Hint::Direction(Direction::Higher) => "Higher!",
            Hint::Direction(Direction::Lower) => "Lower!",
            Hint::Range(Band::VeryClose) => "Very close!",
            Hint::Range(Band::Warm) => "Getting warm!",
            Hint::Range(Band::Lukewarm) => "Lukewarm",
            Hint::Range(Band::Far) => "Far away!",
        };
        f.write_str(text)
    }
}

/// Build the hint for `guess` in the given `style`.
///
/// The window `[cur_lo, cur_hi]` must contain at least one number.
pub fn hint_for(
    style: HintStyle,
    guess: i64,
    secret: i64,
    cur_lo: i64,
    cur_hi: i64,
    threshold: &ThresholdLearner,
) -> Result<Hint, LearnError> {
    if cur_hi < cur_lo {
        return Err(LearnError::invalid_input(
            "hint",
            format!("empty window [{}, {}]", cur_lo, cur_hi),
        ));
    }
    let distance = (guess as i128 - secret as i128).abs() as f64;
    let window = (cur_hi as i128 - cur_lo as i128 + 1) as f64;

    let hint = match style {
        HintStyle::HotCold => Hint::Temperature(threshold.classify(distance, window)?),
        HintStyle::HigherLower => {
            if guess < secret {
                Hint::Direction(Direction::Higher)
            } else {
                Hint::Direction(Direction::Lower)
            }
        }
        HintStyle::Range => {
            let band = if distance < window * VERY_CLOSE {
                Band::VeryClose
            } else if distance < window * WARM {
                Band::Warm
            } else if distance < window * LUKEWARM {
                Band::Lukewarm
            } else {
                Band::Far
            };
            Hint::Range(band)
        }
    };
    Ok(hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hot_cold_uses_threshold() {
        let threshold = ThresholdLearner::new(0.1);
        // window of 100, hot below distance 10
        let hot = hint_for(HintStyle::HotCold, 45, 50, 1, 100, &threshold).unwrap();
        let cold = hint_for(HintStyle::HotCold, 30, 50, 1, 100, &threshold).unwrap();
        assert_eq!(hot, Hint::Temperature(Proximity::Hot));
        assert_eq!(cold, Hint::Temperature(Proximity::Cold));
        assert_eq!(hot.to_string(), "HOT!");
    }

    #[test]
    fn test_direction() {
        let threshold = ThresholdLearner::default();
        assert_eq!(
            hint_for(HintStyle::HigherLower, 10, 50, 1, 100, &threshold).unwrap(),
            Hint::Direction(Direction::Higher)
        );
        assert_eq!(
            hint_for(HintStyle::HigherLower, 90, 50, 1, 100, &threshold).unwrap(),
            Hint::Direction(Direction::Lower)
        );
    }

    #[test]
    fn test_range_bands() {
        let threshold = ThresholdLearner::default();
        let band = |guess| match hint_for(HintStyle::Range, guess, 50, 1, 100, &threshold) {
            Ok(Hint::Range(b)) => b,
            other => panic!("unexpected hint {:?}", other),
        };
        assert_eq!(band(55), Band::VeryClose);
        assert_eq!(band(70), Band::Warm);
        assert_eq!(band(90), Band::Lukewarm);
        assert_eq!(band(100), Band::Far);
        assert!(Band::VeryClose < Band::Far);
    }

    #[test]
    fn test_full_i64_window() {
        let threshold = ThresholdLearner::default();
        let (lo, hi) = (i64::MIN, i64::MAX);
        assert_eq!(
            hint_for(HintStyle::HotCold, lo, hi, lo, hi, &threshold).unwrap(),
            Hint::Temperature(Proximity::Cold)
        );
        assert_eq!(
            hint_for(HintStyle::Range, hi, lo, lo, hi, &threshold).unwrap(),
            Hint::Range(Band::Far)
        );
        assert_eq!(
            hint_for(HintStyle::HotCold, 0, 1, lo, hi, &threshold).unwrap(),
            Hint::Temperature(Proximity::Hot)
        );
    }

    #[test]
    fn test_empty_window_rejected() {
        let threshold = ThresholdLearner::default();
        assert!(hint_for(HintStyle::Range, 5, 5, 10, 9, &threshold).is_err());
    }
}
