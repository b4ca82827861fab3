//! Adaptive learning engine.
//!
//! Three small online learners tune the game to one player:
//!
//! - [`ThresholdLearner`]: the hot/cold proximity multiplier `k`, nudged toward
//!   a target solve speed after every solved round
//! - [`HintBandit`]: an epsilon-greedy bandit choosing the hint style, rewarded
//!   with `1 / attempts` per solved round
//! - [`BiasEstimator`]: an exponential moving average of where in a range the
//!   player likes to pick numbers, used to guess in reverse mode
//!
//! [`LearnerState`] bundles them with the per-player counters and is what a
//! [`ProfileStore`](crate::game::ProfileStore) persists.
//!
//! # Example
//!
//! ```
//! use adaptive_guess::learn::{HintStyle, LearnerConfig, LearnerState, RoundOutcome};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let config = LearnerConfig::default();
//! let mut state = LearnerState::new("ada");
//! let mut rng = StdRng::seed_from_u64(1);
//!
//! let style = state.bandit.select(config.epsilon, &mut rng);
//! state.record_round(&RoundOutcome::solved(6, style), &config).unwrap();
//!
//! assert!(state.threshold.k() > 0.1);
//! assert_eq!(state.bandit.stats().get(style).pulls, 1);
//! ```
//!
//! All learners clamp silently at their bounds; malformed geometry is rejected
//! with [`LearnError::InvalidInput`] and leaves the learner untouched.

pub mod bandit;
pub mod bias;
pub mod config;
pub mod error;
pub mod outcome;
pub mod state;
pub mod threshold;

pub use bandit::{ArmStats, HintBandit, HintStats};
pub use bias::BiasEstimator;
pub use config::{ConfigError, LearnerConfig};
pub use error::LearnError;
pub use outcome::{HintStyle, RoundOutcome};
pub use state::LearnerState;
pub use threshold::{Proximity, ThresholdLearner};
