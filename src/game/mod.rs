//! The game around the learning engine.
//!
//! Everything here is glue that feeds the learners and shows their decisions:
//!
//! - [`profile`]: loading and saving [`LearnerState`](crate::learn::LearnerState)
//! - [`hint`]: turning a guess into a hint in the chosen style
//! - [`round`]: I/O-free state machines for forward and reverse rounds
//! - [`session`]: the interactive console menu
//! - [`simulate`]: scripted players for batch runs
//!
//! ## Game Modes
//!
//! ```text
//! forward:  engine picks a secret in [1, range_size]
//!           player guesses, gets a hint in the bandit's style + higher/lower
//!           solved round -> threshold, bandit, counters, range size
//!
//! reverse:  player picks a number in [1, range_size]
//!           engine guesses at its learned bias point, player says h / l / c
//!           correct guess -> bias estimator
//! ```

pub mod hint;
pub mod profile;
pub mod round;
pub mod session;
pub mod simulate;

pub use hint::{Band, Direction, Hint};
pub use profile::{JsonProfileStore, MemoryProfileStore, ProfileError, ProfileStore};
pub use round::{Answer, GuessFeedback, GuessRound, ReverseRound, ReverseStatus, RoundError};
pub use session::{prompt_username, Session, SessionError, DEFAULT_USERNAME};
pub use simulate::{SimulationReport, SyntheticPlayer};
