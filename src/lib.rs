//! # Adaptive Guess
//!
//! A number-guessing game that adapts its hints and difficulty to each player
//! across sessions, using small online-learning heuristics.
//!
//! ## Features
//!
//! - **Hot/Cold Threshold**: learns how generous "hot" should be for a player
//! - **Hint Bandit**: epsilon-greedy choice among hint presentation styles
//! - **Bias Estimator**: learns where a player tends to pick numbers and uses
//!   it to guess in reverse mode
//! - **Profiles**: per-player state saved as JSON between sessions
//! - **Simulation**: synthetic players to watch the learners drift
//!
//! ## Quick Start
//!
//! ```ignore
//! use adaptive_guess::game::{JsonProfileStore, Session};
//! use adaptive_guess::learn::LearnerConfig;
//!
//! let store = JsonProfileStore::new("profiles");
//! let mut session = Session::open(store, "ada", LearnerConfig::default(), rand::thread_rng())?;
//! session.run(&mut std::io::stdin().lock(), &mut std::io::stdout())?;
//! ```
//!
//! ## Modules
//!
//! - [`learn`]: the learning engine (threshold, bandit, bias, state, config)
//! - [`game`]: profile storage, rounds, console session and simulator
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Session / Simulator (orchestration)             │
//! │  - menu and prompts         - synthetic players                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ drives GuessRound / ReverseRound
//!                               ▼
//!         ┌─────────────────────┼─────────────────────┐
//!         │                     │                     │
//!         ▼                     ▼                     ▼
//!   ┌───────────┐        ┌────────────┐        ┌─────────────┐
//!   │ Threshold │        │    Hint    │        │    Bias     │
//!   │  Learner  │        │   Bandit   │        │  Estimator  │
//!   └───────────┘        └────────────┘        └─────────────┘
//!                               │
//!                               ▼
//!                     LearnerState ⇄ ProfileStore
//! ```

#![warn(missing_docs)]

/// Adaptive learning engine.
///
/// The only part of the crate with algorithmic content.
pub mod learn;

/// Game modes, persistence and orchestration around the engine.
pub mod game;

// Re-export commonly used types at crate root for convenience
pub use learn::{
    BiasEstimator, HintBandit, HintStyle, LearnError, LearnerConfig, LearnerState, RoundOutcome,
    ThresholdLearner,
};
