//! Round state machines for both game modes.
//!
//! These hold no I/O. A console session, the simulator and the tests all drive
//! the same [`GuessRound`] and [`ReverseRound`] types and feed the results back
//! into a [`LearnerState`].

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::game::hint::{hint_for, Direction, Hint};
use crate::learn::{BiasEstimator, HintStyle, LearnError, LearnerConfig, LearnerState, RoundOutcome};

/// Errors raised while playing a round.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoundError {
    /// The guess lies outside the current search window.
    #[error("guess {guess} is outside [{low}, {high}]")]
    OutOfWindow {
        /// Rejected guess
        guess: i64,
        /// Window lower bound
        low: i64,
        /// Window upper bound
        high: i64,
    },

    /// The round has already ended.
    #[error("round is already over")]
    Finished,

    /// An answer arrived before any guess was made.
    #[error("no guess is waiting for an answer")]
    NoPendingGuess,

    /// Reverse-mode answers ruled out every number.
    #[error("answers are contradictory: no number fits [{low}, {high}]")]
    Contradiction {
        /// Window lower bound after the last answer
        low: i64,
        /// Window upper bound after the last answer
        high: i64,
    },

    /// A learner rejected its input.
    #[error(transparent)]
    Learn(#[from] LearnError),
}

/// What the player learns after one forward-mode guess.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuessFeedback {
    /// Hint in the round's style.
    pub hint: Hint,
    /// Where the secret lies, `None` when the guess was right.
    pub direction: Option<Direction>,
    /// Set once the round is solved.
    pub outcome: Option<RoundOutcome>,
}

impl GuessFeedback {
    /// Whether this guess found the secret.
    pub fn is_correct(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Forward mode: the player guesses a secret in `[low, high]`.
#[derive(Debug, Clone)]
pub struct GuessRound {
    low: i64,
    high: i64,
    secret: i64,
    cur_lo: i64,
    cur_hi: i64,
    attempts: u32,
    style: HintStyle,
    finished: bool,
}

impl GuessRound {
    /// Create a round with a fixed secret and hint style.
    pub fn new(low: i64, high: i64, secret: i64, style: HintStyle) -> Result<Self, RoundError> {
        if high <= low {
            return Err(LearnError::invalid_input(
                "new round",
                format!("degenerate range [{}, {}]", low, high),
            )
            .into());
        }
        if !(low..=high).contains(&secret) {
            return Err(RoundError::OutOfWindow {
                guess: secret,
                low,
                high,
            });
        }
        Ok(Self {
            low,
            high,
            secret,
            cur_lo: low,
            cur_hi: high,
            attempts: 0,
            style,
            finished: false,
        })
    }

    /// Start a round over `[1, range_size]` with a random secret and a
    /// bandit-chosen hint style.
    pub fn start<R: Rng>(state: &LearnerState, config: &LearnerConfig, rng: &mut R) -> Self {
        let high = state.range_size.max(2) as i64;
        let secret = rng.gen_range(1..=high);
        let style = state.bandit.select(config.epsilon, rng);
        debug!(user = %state.username, high, %style, "forward round started");
        Self {
            low: 1,
            high,
            secret,
            cur_lo: 1,
            cur_hi: high,
            attempts: 0,
            style,
            finished: false,
        }
    }

    /// Full range of the round.
    pub fn range(&self) -> (i64, i64) {
        (self.low, self.high)
    }

    /// Current search window.
    pub fn window(&self) -> (i64, i64) {
        (self.cur_lo, self.cur_hi)
    }

    /// Hint style for this round.
    pub fn style(&self) -> HintStyle {
        self.style
    }

    /// Guesses counted so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether the round has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The secret. Only meant for reveal after the round ends and for tests.
    pub fn secret(&self) -> i64 {
        self.secret
    }

    /// Submit a guess. Out-of-window guesses are rejected without counting.
    ///
    /// On a correct guess the outcome is recorded in `state`.
    pub fn guess(
        &mut self,
        value: i64,
        state: &mut LearnerState,
        config: &LearnerConfig,
    ) -> Result<GuessFeedback, RoundError> {
        if self.finished {
            return Err(RoundError::Finished);
        }
        if value < self.cur_lo || value > self.cur_hi {
            return Err(RoundError::OutOfWindow {
                guess: value,
                low: self.cur_lo,
                high: self.cur_hi,
            });
        }

        let hint = hint_for(
            self.style,
            value,
            self.secret,
            self.cur_lo,
            self.cur_hi,
            &state.threshold,
        )?;

        let mut bias = state.bias;
        if config.learn_bias_from_guesses && self.cur_hi > self.cur_lo {
            bias.update(value, self.cur_lo, self.cur_hi, config.bias_learning_rate)?;
        }

        let attempts = self.attempts + 1;
        if value == self.secret {
            let outcome = RoundOutcome::solved(attempts, self.style);
            state.record_round(&outcome, config)?;
            state.bias = bias;
            self.attempts = attempts;
            self.finished = true;
            debug!(user = %state.username, attempts, style = %self.style, "forward round solved");
            return Ok(GuessFeedback {
                hint,
                direction: None,
                outcome: Some(outcome),
            });
        }

        state.bias = bias;
        self.attempts = attempts;
        let direction = if value < self.secret {
            self.cur_lo = value + 1;
            Direction::Higher
        } else {
            self.cur_hi = value - 1;
            Direction::Lower
        };
        Ok(GuessFeedback {
            hint,
            direction: Some(direction),
            outcome: None,
        })
    }

    /// Give up. The outcome is unsolved and teaches the learners nothing.
    pub fn abandon(&mut self) -> RoundOutcome {
        self.finished = true;
        debug!(attempts = self.attempts, style = %self.style, "forward round abandoned");
        RoundOutcome::abandoned(self.attempts.max(1), self.style)
    }
}

/// Player's reply to a reverse-mode guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// The number is larger than the guess.
    Higher,
    /// The number is smaller than the guess.
    Lower,
    /// The guess is the number.
    Correct,
}

/// Result of answering a reverse-mode guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverseStatus {
    /// Keep guessing inside the new window.
    Continue {
        /// Window lower bound
        low: i64,
        /// Window upper bound
        high: i64,
    },
    /// The engine found the number.
    Solved {
        /// Guesses it took
        attempts: u32,
        /// The player's number
        number: i64,
    },
}

/// Reverse mode: the engine guesses a number the player picked in `[low, high]`.
#[derive(Debug, Clone)]
pub struct ReverseRound {
    low: i64,
    high: i64,
    cur_lo: i64,
    cur_hi: i64,
    attempts: u32,
    pending: Option<i64>,
    finished: bool,
}

impl ReverseRound {
    /// Create a round over `[low, high]`.
    pub fn new(low: i64, high: i64) -> Result<Self, RoundError> {
        if high <= low {
            return Err(LearnError::invalid_input(
                "new reverse round",
                format!("degenerate range [{}, {}]", low, high),
            )
            .into());
        }
        Ok(Self {
            low,
            high,
            cur_lo: low,
            cur_hi: high,
            attempts: 0,
            pending: None,
            finished: false,
        })
    }

    /// Current search window.
    pub fn window(&self) -> (i64, i64) {
        (self.cur_lo, self.cur_hi)
    }

    /// Guesses made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether the round has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Produce the next guess from the player's bias, then apply the optional
    /// jitter step from `config.reverse_jitter`.
    pub fn next_guess<R: Rng>(
        &mut self,
        state: &LearnerState,
        config: &LearnerConfig,
        rng: &mut R,
    ) -> Result<i64, RoundError> {
        if self.finished {
            return Err(RoundError::Finished);
        }
        if let Some(guess) = self.pending {
            return Ok(guess);
        }

        let predicted = state.bias.predict(self.cur_lo, self.cur_hi)?;
        let guess = BiasEstimator::jitter(
            predicted,
            self.cur_lo,
            self.cur_hi,
            config.reverse_jitter,
            rng,
        );
        self.attempts += 1;
        self.pending = Some(guess);
        Ok(guess)
    }

    /// Apply the player's answer to the pending guess.
    ///
    /// A correct answer teaches the bias estimator where the player's number
    /// sat in the full range.
    pub fn answer(
        &mut self,
        answer: Answer,
        state: &mut LearnerState,
        config: &LearnerConfig,
    ) -> Result<ReverseStatus, RoundError> {
        if self.finished {
            return Err(RoundError::Finished);
        }
        let guess = self.pending.ok_or(RoundError::NoPendingGuess)?;

        match answer {
            Answer::Correct => {
                state
                    .bias
                    .update(guess, self.low, self.high, config.bias_learning_rate)?;
                self.pending = None;
                self.finished = true;
                debug!(user = %state.username, attempts = self.attempts, number = guess, "reverse round solved");
                Ok(ReverseStatus::Solved {
                    attempts: self.attempts,
                    number: guess,
                })
            }
            Answer::Higher | Answer::Lower => {
                let (lo, hi) = if answer == Answer::Higher {
                    (guess + 1, self.cur_hi)
                } else {
                    (self.cur_lo, guess - 1)
                };
                self.pending = None;
                if lo > hi {
                    self.finished = true;
                    return Err(RoundError::Contradiction { low: lo, high: hi });
                }
                self.cur_lo = lo;
                self.cur_hi = hi;
                Ok(ReverseStatus::Continue { low: lo, high: hi })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learn::Proximity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet_config() -> LearnerConfig {
        LearnerConfig {
            learn_bias_from_guesses: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_forward_round_narrows_and_solves() {
        let config = quiet_config();
        let mut state = LearnerState::new("ada");
        let mut round = GuessRound::new(1, 100, 37, HintStyle::HigherLower).unwrap();

        let fb = round.guess(50, &mut state, &config).unwrap();
        assert_eq!(fb.direction, Some(Direction::Lower));
        assert_eq!(round.window(), (1, 49));

        let fb = round.guess(25, &mut state, &config).unwrap();
        assert_eq!(fb.direction, Some(Direction::Higher));
        assert_eq!(round.window(), (26, 49));

        let fb = round.guess(37, &mut state, &config).unwrap();
        assert!(fb.is_correct());
        assert_eq!(fb.outcome, Some(RoundOutcome::solved(3, HintStyle::HigherLower)));
        assert!(round.is_finished());

        assert_eq!(state.games_played, 1);
        assert_eq!(state.total_attempts, 3);
        assert_eq!(state.hint_stats().higher_lower.pulls, 1);
        assert_eq!(state.threshold.k(), 0.1);
        assert_eq!(round.guess(37, &mut state, &config), Err(RoundError::Finished));
    }

    #[test]
    fn test_out_of_window_guess_not_counted() {
        let config = quiet_config();
        let mut state = LearnerState::new("ada");
        let mut round = GuessRound::new(1, 100, 60, HintStyle::HotCold).unwrap();
        round.guess(50, &mut state, &config).unwrap();
        let err = round.guess(10, &mut state, &config).unwrap_err();
        assert_eq!(
            err,
            RoundError::OutOfWindow {
                guess: 10,
                low: 51,
                high: 100
            }
        );
        assert_eq!(round.attempts(), 1);
    }

    #[test]
    fn test_hot_cold_feedback_in_window() {
        let config = quiet_config();
        let mut state = LearnerState::new("ada");
        let mut round = GuessRound::new(1, 100, 50, HintStyle::HotCold).unwrap();
        let fb = round.guess(45, &mut state, &config).unwrap();
        assert_eq!(fb.hint, Hint::Temperature(Proximity::Hot));
    }

    #[test]
    fn test_abandon_teaches_nothing() {
        let config = LearnerConfig::default();
        let mut state = LearnerState::new("ada");
        let mut round = GuessRound::new(1, 100, 99, HintStyle::Range).unwrap();
        round.guess(10, &mut state, &config).unwrap();
        let alpha = state.bias.alpha();

        let outcome = round.abandon();
        assert!(!outcome.solved);
        state.record_round(&outcome, &config).unwrap();
        assert_eq!(state.games_played, 0);
        assert_eq!(state.hint_stats().total_pulls(), 0);
        assert_eq!(state.bias.alpha(), alpha);
    }

    #[test]
    fn test_forward_guesses_feed_bias() {
        let config = LearnerConfig::default();
        let mut state = LearnerState::new("ada");
        let mut round = GuessRound::new(1, 100, 2, HintStyle::HigherLower).unwrap();
        round.guess(100, &mut state, &config).unwrap();
        assert!(state.bias.alpha() > 0.5);
    }

    #[test]
    fn test_start_uses_profile_range() {
        let mut state = LearnerState::new("ada");
        state.range_size = 10;
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            let round = GuessRound::start(&state, &LearnerConfig::default(), &mut rng);
            assert_eq!(round.range(), (1, 10));
            assert!((1..=10).contains(&round.secret()));
        }
    }

    #[test]
    fn test_invalid_round_rejected() {
        assert!(GuessRound::new(5, 5, 5, HintStyle::Range).is_err());
        assert!(GuessRound::new(1, 10, 11, HintStyle::Range).is_err());
        assert!(ReverseRound::new(3, 1).is_err());
    }

    #[test]
    fn test_reverse_round_bisects_with_neutral_bias() {
        let config = LearnerConfig::default();
        let mut state = LearnerState::new("ada");
        let mut rng = StdRng::seed_from_u64(1);
        let mut round = ReverseRound::new(1, 100).unwrap();
        let number = 73;

        loop {
            let guess = round.next_guess(&state, &config, &mut rng).unwrap();
            let answer = if guess == number {
                Answer::Correct
            } else if guess < number {
                Answer::Higher
            } else {
                Answer::Lower
            };
            if let ReverseStatus::Solved { attempts, number: n } =
                round.answer(answer, &mut state, &config).unwrap()
            {
                assert_eq!(n, number);
                assert!(attempts <= 7);
                break;
            }
        }
        assert!(state.bias.alpha() > 0.5);
    }

    #[test]
    fn test_reverse_first_guess_follows_bias() {
        let config = LearnerConfig::default();
        let mut state = LearnerState::new("ada");
        state.bias = BiasEstimator::new(0.8);
        let mut rng = StdRng::seed_from_u64(1);
        let mut round = ReverseRound::new(0, 10).unwrap();
        assert_eq!(round.next_guess(&state, &config, &mut rng).unwrap(), 8);
        // repeated calls return the pending guess
        assert_eq!(round.next_guess(&state, &config, &mut rng).unwrap(), 8);
        assert_eq!(round.attempts(), 1);
    }

    #[test]
    fn test_reverse_contradiction_detected() {
        let config = LearnerConfig::default();
        let mut state = LearnerState::new("ada");
        let mut rng = StdRng::seed_from_u64(1);
        let mut round = ReverseRound::new(1, 2).unwrap();

        let first = round.next_guess(&state, &config, &mut rng).unwrap();
        assert_eq!(first, 2);
        round.answer(Answer::Lower, &mut state, &config).unwrap();
        let second = round.next_guess(&state, &config, &mut rng).unwrap();
        assert_eq!(second, 1);
        assert!(matches!(
            round.answer(Answer::Lower, &mut state, &config),
            Err(RoundError::Contradiction { .. })
        ));
        assert!(round.is_finished());
        assert_eq!(state.bias.alpha(), 0.5);
    }

    #[test]
    fn test_answer_without_guess() {
        let mut state = LearnerState::new("ada");
        let mut round = ReverseRound::new(1, 10).unwrap();
        assert_eq!(
            round.answer(Answer::Higher, &mut state, &LearnerConfig::default()),
            Err(RoundError::NoPendingGuess)
        );
    }
}
