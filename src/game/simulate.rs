//! Synthetic players for exercising the learners without a human.
//!
//! A [`SyntheticPlayer`] picks numbers around a preferred position with some
//! noise, and uses hints the way a reasonable person would: a hot or graded
//! hint narrows the region it believes the secret is in. Playing many rounds
//! against one [`LearnerState`] shows how `k`, the bandit and `alpha` drift.
//!
//! Independent players run in parallel via `rayon`; each owns its state and a
//! seeded RNG, so results are reproducible for a given base seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::hint::Hint;
use crate::game::round::{Answer, GuessRound, ReverseRound, ReverseStatus, RoundError};
use crate::learn::{HintStyle, LearnerConfig, LearnerState, Proximity, RoundOutcome};

/// Default give-up point for a forward round.
pub const DEFAULT_PATIENCE: u32 = 30;

/// A scripted player with a fixed number-picking habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticPlayer {
    /// Profile name.
    pub name: String,
    /// Favourite position in any range, `0` bottom to `1` top.
    pub preferred_position: f64,
    /// Half-width of the uniform noise added to the preferred position.
    pub noise: f64,
    /// Attempts after which the player gives up.
    pub patience: u32,
}

impl SyntheticPlayer {
    /// Create a player; `preferred_position` and `noise` are clamped into `[0, 1]`.
    pub fn new(name: impl Into<String>, preferred_position: f64, noise: f64) -> Self {
        Self {
            name: name.into(),
            preferred_position: preferred_position.clamp(0.0, 1.0),
            noise: noise.clamp(0.0, 1.0),
            patience: DEFAULT_PATIENCE,
        }
    }

    /// Builder method: set patience.
    pub fn with_patience(mut self, patience: u32) -> Self {
        self.patience = patience.max(1);
        self
    }

    /// A small cast of players with different habits.
    pub fn roster() -> Vec<SyntheticPlayer> {
        vec![
            SyntheticPlayer::new("low_picker", 0.15, 0.1),
            SyntheticPlayer::new("centrist", 0.5, 0.05),
            SyntheticPlayer::new("high_picker", 0.85, 0.1),
            SyntheticPlayer::new("erratic", 0.5, 0.5),
        ]
    }

    /// Pick a number in `[low, high]` following this player's habit.
    pub fn pick<R: Rng>(&self, low: i64, high: i64, rng: &mut R) -> i64 {
        if high <= low {
            return low;
        }
        let jitter = if self.noise > 0.0 {
            rng.gen_range(-self.noise..=self.noise)
        } else {
            0.0
        };
        let position = (self.preferred_position + jitter).clamp(0.0, 1.0);
        let offset = (position * (high - low) as f64).round() as i64;
        (low + offset).clamp(low, high)
    }

    /// Play one forward round against `state`, giving up after `patience` guesses.
    pub fn play_forward<R: Rng>(
        &self,
        state: &mut LearnerState,
        config: &LearnerConfig,
        rng: &mut R,
    ) -> Result<RoundOutcome, RoundError> {
        let mut round = GuessRound::start(state, config, rng);
        let (mut belief_lo, mut belief_hi) = round.window();

        loop {
            if round.attempts() >= self.patience {
                let outcome = round.abandon();
                state.record_round(&outcome, config)?;
                return Ok(outcome);
            }

            let (cur_lo, cur_hi) = round.window();
            let (lo, hi) = intersect((belief_lo, belief_hi), (cur_lo, cur_hi));
            let guess = self.pick(lo, hi, rng);
            let window = (cur_hi - cur_lo + 1) as f64;
            let k = state.threshold.k();

            let feedback = round.guess(guess, state, config)?;
            if let Some(outcome) = feedback.outcome {
                return Ok(outcome);
            }

            let reach = match feedback.hint {
                Hint::Temperature(Proximity::Hot) => Some(k * window),
                Hint::Range(band) => Some(band.max_fraction() * window),
                Hint::Temperature(Proximity::Cold) | Hint::Direction(_) => None,
            };
            if let Some(reach) = reach {
                let reach = reach.ceil() as i64;
                belief_lo = belief_lo.max(guess - reach);
                belief_hi = belief_hi.min(guess + reach);
            }
        }
    }

    /// Play one reverse round: pick a number and answer the engine honestly.
    ///
    /// Returns the number of guesses the engine needed.
    pub fn play_reverse<R: Rng>(
        &self,
        state: &mut LearnerState,
        config: &LearnerConfig,
        rng: &mut R,
    ) -> Result<u32, RoundError> {
        let high = state.range_size as i64;
        let number = self.pick(1, high, rng);
        let mut round = ReverseRound::new(1, high)?;

        loop {
            let guess = round.next_guess(state, config, rng)?;
            let answer = if guess == number {
                Answer::Correct
            } else if guess < number {
                Answer::Higher
            } else {
                Answer::Lower
            };
            if let ReverseStatus::Solved { attempts, .. } = round.answer(answer, state, config)? {
                return Ok(attempts);
            }
        }
    }
}

/// Overlap of two windows; falls back to `b` when they are disjoint.
fn intersect(a: (i64, i64), b: (i64, i64)) -> (i64, i64) {
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    if lo <= hi {
        (lo, hi)
    } else {
        b
    }
}

/// Summary of one simulated player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// The simulated player.
    pub player: SyntheticPlayer,
    /// Forward rounds played.
    pub forward_rounds: u32,
    /// Forward rounds solved.
    pub solved: u32,
    /// Forward rounds abandoned.
    pub abandoned: u32,
    /// Mean engine guesses per reverse round.
    pub reverse_mean_attempts: Option<f64>,
    /// Style with the best average reward at the end, if any was tried.
    pub best_style: Option<HintStyle>,
    /// Final learning state.
    pub state: LearnerState,
}

/// Play `rounds` forward rounds and `rounds` reverse rounds for one player.
pub fn simulate_player(
    player: &SyntheticPlayer,
    config: &LearnerConfig,
    rounds: u32,
    seed: u64,
) -> Result<SimulationReport, RoundError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = LearnerState::new(player.name.clone());
    let mut solved = 0;
    let mut abandoned = 0;
    let mut reverse_total = 0u64;

    for _ in 0..rounds {
        let outcome = player.play_forward(&mut state, config, &mut rng)?;
        if outcome.solved {
            solved += 1;
        } else {
            abandoned += 1;
        }
        reverse_total += player.play_reverse(&mut state, config, &mut rng)? as u64;
    }

    let best = state.bandit.best_arms();
    debug!(
        player = %player.name,
        k = state.threshold.k(),
        alpha = state.bias.alpha(),
        solved,
        "simulation finished"
    );

    Ok(SimulationReport {
        player: player.clone(),
        forward_rounds: rounds,
        solved,
        abandoned,
        reverse_mean_attempts: (rounds > 0).then(|| reverse_total as f64 / rounds as f64),
        best_style: best.first().copied(),
        state,
    })
}

/// Simulate many players in parallel. Player `i` is seeded with `seed + i`.
///
/// `on_done` is called once per finished player, from worker threads.
pub fn simulate_many<F>(
    players: &[SyntheticPlayer],
    config: &LearnerConfig,
    rounds: u32,
    seed: u64,
    on_done: F,
) -> Vec<Result<SimulationReport, RoundError>>
where
    F: Fn(&SyntheticPlayer) + Sync,
{
    players
        .par_iter()
        .enumerate()
        .map(|(i, player)| {
            let report = simulate_player(player, config, rounds, seed.wrapping_add(i as u64));
            on_done(player);
            report
        })
        .collect()
}
