//! Console session: menu, prompts and profile lifecycle for one player.
//!
//! The session is generic over its input and output streams so the same code
//! serves the `guess` binary (stdin/stdout) and scripted tests.

use std::io::{self, BufRead, Write};

use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use crate::game::hint::Direction;
use crate::game::profile::{validate_username, ProfileError, ProfileStore};
use crate::game::round::{Answer, GuessRound, ReverseRound, ReverseStatus, RoundError};
use crate::learn::{ConfigError, LearnerConfig, LearnerState, RoundOutcome};

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Terminal I/O failed.
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
    /// Loading or saving the profile failed.
    #[error(transparent)]
    Profile(#[from] ProfileError),
    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// A round hit an unexpected error.
    #[error(transparent)]
    Round(#[from] RoundError),
}

/// Menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Forward,
    Reverse,
    Stats,
    Save,
    Quit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Forward),
            "2" => Some(MenuChoice::Reverse),
            "3" => Some(MenuChoice::Stats),
            "4" => Some(MenuChoice::Save),
            "5" | "q" | "quit" => Some(MenuChoice::Quit),
            _ => None,
        }
    }
}

/// One player's interactive session.
pub struct Session<S: ProfileStore, R: Rng> {
    store: S,
    state: LearnerState,
    config: LearnerConfig,
    rng: R,
    returning: bool,
}

impl<S: ProfileStore, R: Rng> Session<S, R> {
    /// Load (or create) the profile for `username` and validate `config`.
    pub fn open(store: S, username: &str, config: LearnerConfig, rng: R) -> Result<Self, SessionError> {
        config.validate()?;
        let returning = store.exists(username);
        let state = store.load(username)?;
        info!(user = username, returning, "session opened");
        Ok(Self {
            store,
            state,
            config,
            rng,
            returning,
        })
    }

    /// Open a session, falling back to a fresh profile if the stored one is
    /// unreadable. The bad record is overwritten on the next save.
    pub fn open_or_reset(
        store: S,
        username: &str,
        config: LearnerConfig,
        rng: R,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let (state, returning) = match store.load(username) {
            Ok(state) => (state, store.exists(username)),
            Err(err @ (ProfileError::Corrupt { .. } | ProfileError::Json(_))) => {
                warn!(user = username, error = %err, "starting over with a fresh profile");
                (LearnerState::new(username), false)
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            store,
            state,
            config,
            rng,
            returning,
        })
    }

    /// Current learning state.
    pub fn state(&self) -> &LearnerState {
        &self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Whether the profile existed before this session.
    pub fn is_returning(&self) -> bool {
        self.returning
    }

    /// Profile store backing this session.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist the current state.
    pub fn save(&mut self) -> Result<(), SessionError> {
        self.store.save(&self.state)?;
        Ok(())
    }

    /// Run the menu loop until the player quits or input ends. The profile is
    /// saved on the way out.
    pub fn run<I: BufRead, O: Write>(&mut self, input: &mut I, out: &mut O) -> Result<(), SessionError> {
        writeln!(out, "Adaptive Number Guessing Game")?;
        writeln!(out, "========================================")?;
        if self.returning {
            writeln!(out, "Welcome back, {}! I remember you.", self.state.username)?;
        }

        loop {
            writeln!(out)?;
            writeln!(out, "Game Modes:")?;
            writeln!(out, "1. You guess my number (with adaptive hints)")?;
            writeln!(out, "2. I guess your number (I learn your patterns)")?;
            writeln!(out, "3. Show my stats")?;
            writeln!(out, "4. Save profile")?;
            writeln!(out, "5. Quit")?;
            write!(out, "{}, what would you like to do? (1-5): ", self.state.username)?;
            out.flush()?;

            let Some(line) = read_line(input)? else {
                writeln!(out)?;
                break;
            };
            match MenuChoice::parse(&line) {
                Some(MenuChoice::Forward) => {
                    self.play_forward(input, out)?;
                }
                Some(MenuChoice::Reverse) => {
                    self.play_reverse(input, out)?;
                }
                Some(MenuChoice::Stats) => self.write_stats(out)?,
                Some(MenuChoice::Save) => {
                    self.save()?;
                    writeln!(out, "Profile saved for {}", self.state.username)?;
                }
                Some(MenuChoice::Quit) => break,
                None => writeln!(out, "Please enter 1-5.")?,
            }
        }

        self.save()?;
        writeln!(out, "Thanks for playing! Your profile has been saved.")?;
        Ok(())
    }

    /// Play one forward round. Returns `None` if input ended mid-round.
    ///
    /// Typing `q` gives up; an abandoned round is reported but not learned from.
    pub fn play_forward<I: BufRead, O: Write>(
        &mut self,
        input: &mut I,
        out: &mut O,
    ) -> Result<Option<RoundOutcome>, SessionError> {
        let mut round = GuessRound::start(&self.state, &self.config, &mut self.rng);
        let (low, high) = round.range();

        writeln!(out)?;
        writeln!(out, "I'm thinking of a number between {} and {}.", low, high)?;
        writeln!(
            out,
            "Based on your profile, I think you'll pick numbers around position {:.2}",
            self.state.bias.alpha()
        )?;
        writeln!(out, "Using hint style: {}", round.style())?;

        loop {
            let (cur_lo, cur_hi) = round.window();
            write!(out, "Your guess [{}-{}] (q to give up): ", cur_lo, cur_hi)?;
            out.flush()?;

            let line = match read_line(input)? {
                Some(line) => line,
                None => {
                    writeln!(out)?;
                    let outcome = round.abandon();
                    self.state.record_round(&outcome, &self.config).map_err(RoundError::from)?;
                    return Ok(None);
                }
            };
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                let outcome = round.abandon();
                self.state.record_round(&outcome, &self.config).map_err(RoundError::from)?;
                writeln!(out, "The number was {}.", round.secret())?;
                return Ok(Some(outcome));
            }

            let Ok(value) = line.parse::<i64>() else {
                writeln!(out, "Numbers only, please!")?;
                continue;
            };

            match round.guess(value, &mut self.state, &self.config) {
                Ok(feedback) => {
                    writeln!(out, "Hint: {}", feedback.hint)?;
                    if let Some(outcome) = feedback.outcome {
                        writeln!(
                            out,
                            "Bang! You got it in {} attempts!",
                            outcome.attempts_taken
                        )?;
                        return Ok(Some(outcome));
                    }
                    match feedback.direction {
                        Some(Direction::Higher) => writeln!(out, "Higher.")?,
                        Some(Direction::Lower) => writeln!(out, "Lower.")?,
                        None => {}
                    }
                }
                Err(RoundError::OutOfWindow { low, high, .. }) => {
                    writeln!(out, "Stay in range [{}, {}].", low, high)?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Play one reverse round. Returns `None` if the round did not finish.
    pub fn play_reverse<I: BufRead, O: Write>(
        &mut self,
        input: &mut I,
        out: &mut O,
    ) -> Result<Option<ReverseStatus>, SessionError> {
        let high = self.state.range_size as i64;
        let mut round = ReverseRound::new(1, high)?;

        writeln!(out)?;
        writeln!(out, "Think of a number between 1 and {}.", high)?;
        writeln!(
            out,
            "I'll try to read your mind using my learned alpha: {:.2}",
            self.state.bias.alpha()
        )?;
        write!(out, "Press Enter when you're ready...")?;
        out.flush()?;
        if read_line(input)?.is_none() {
            writeln!(out)?;
            return Ok(None);
        }

        loop {
            let guess = round.next_guess(&self.state, &self.config, &mut self.rng)?;
            writeln!(out, "My guess #{}: {}", round.attempts(), guess)?;
            write!(out, "Is it (h)igher, (l)ower, or (c)orrect? ")?;
            out.flush()?;

            let Some(line) = read_line(input)? else {
                writeln!(out)?;
                writeln!(out, "Game interrupted.")?;
                return Ok(None);
            };
            let answer = match line.trim().to_ascii_lowercase().as_str() {
                "h" | "higher" => Answer::Higher,
                "l" | "lower" => Answer::Lower,
                "c" | "correct" => Answer::Correct,
                _ => {
                    writeln!(out, "Please enter h, l, or c.")?;
                    continue;
                }
            };

            match round.answer(answer, &mut self.state, &self.config) {
                Ok(status @ ReverseStatus::Solved { attempts, .. }) => {
                    writeln!(out, "Got it in {} attempts!", attempts)?;
                    return Ok(Some(status));
                }
                Ok(ReverseStatus::Continue { low, high }) => {
                    let word = if answer == Answer::Higher { "Higher" } else { "Lower" };
                    writeln!(out, "{} than {}. Range: [{}, {}]", word, guess, low, high)?;
                }
                Err(RoundError::Contradiction { .. }) => {
                    writeln!(out, "Something's wrong with the range!")?;
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Print the player's statistics.
    pub fn write_stats<O: Write>(&self, out: &mut O) -> io::Result<()> {
        let state = &self.state;
        writeln!(out)?;
        writeln!(out, "{}'s Stats:", state.username)?;
        writeln!(out, "   Games played: {}", state.games_played)?;
        match state.avg_attempts {
            Some(avg) => writeln!(out, "   Average attempts: {:.1}", avg)?,
            None => writeln!(out, "   Average attempts: N/A")?,
        }
        writeln!(out, "   Current range size: {}", state.range_size)?;
        writeln!(out, "   Alpha (number bias): {:.3}", state.bias.alpha())?;
        writeln!(out, "   Hot/Cold threshold (k): {:.3}", state.threshold.k())?;
        writeln!(out, "   Hint style performance:")?;
        for (style, arm) in state.hint_stats().iter() {
            if let Some(avg) = arm.average() {
                writeln!(
                    out,
                    "     {}: {:.2} avg reward ({} games)",
                    style, avg, arm.pulls
                )?;
            }
        }
        Ok(())
    }

    /// Consume the session, returning the store and final state.
    pub fn into_parts(self) -> (S, LearnerState) {
        (self.store, self.state)
    }
}

/// Read one line without its terminator, or `None` at end of input.
/// Name used when the player just presses enter (or input ends).
pub const DEFAULT_USERNAME: &str = "Player";

/// Ask for a username until the answer can be used as a profile key.
///
/// An empty answer or end of input picks [`DEFAULT_USERNAME`].
pub fn prompt_username<I: BufRead, O: Write>(input: &mut I, out: &mut O) -> io::Result<String> {
    loop {
        write!(out, "Enter your username: ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            writeln!(out)?;
            return Ok(DEFAULT_USERNAME.to_string());
        };
        let name = line.trim();
        if name.is_empty() {
            return Ok(DEFAULT_USERNAME.to_string());
        }
        match validate_username(name) {
            Ok(()) => return Ok(name.to_string()),
            Err(err) => writeln!(out, "{}", err)?,
        }
    }
}

fn read_line<I: BufRead>(input: &mut I) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::profile::MemoryProfileStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn session(store: MemoryProfileStore) -> Session<MemoryProfileStore, StdRng> {
        Session::open(
            store,
            "ada",
            LearnerConfig::default().with_seed(1),
            StdRng::seed_from_u64(1),
        )
        .unwrap()
    }

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse(" 1 "), Some(MenuChoice::Forward));
        assert_eq!(MenuChoice::parse("q"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse("9"), None);
    }

    #[test]
    fn test_read_line_strips_terminators() {
        let mut input = Cursor::new("42\r\nnext\n");
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("42"));
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("next"));
        assert_eq!(read_line(&mut input).unwrap(), None);
    }

    #[test]
    fn test_give_up_round() {
        let mut s = session(MemoryProfileStore::new());
        let mut input = Cursor::new("abc\n0\nq\n");
        let mut out = Vec::new();
        let outcome = s.play_forward(&mut input, &mut out).unwrap().unwrap();
        assert!(!outcome.solved);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Numbers only, please!"));
        assert!(text.contains("Stay in range [1, 100]."));
        assert!(text.contains("The number was"));
        assert_eq!(s.state().games_played, 0);
    }

    #[test]
    fn test_stats_output() {
        let s = session(MemoryProfileStore::new());
        let mut out = Vec::new();
        s.write_stats(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("ada's Stats:"));
        assert!(text.contains("Average attempts: N/A"));
        assert!(text.contains("Hot/Cold threshold (k): 0.100"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Session::open(
            MemoryProfileStore::new(),
            "ada",
            LearnerConfig::default().with_target_attempts(0),
            StdRng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    fn test_eof_saves_profile() {
        let mut s = session(MemoryProfileStore::new());
        let mut out = Vec::new();
        s.run(&mut Cursor::new(""), &mut out).unwrap();
        let (store, _) = s.into_parts();
        assert!(store.exists("ada"));
    }

    #[test]
    fn test_reset_corrupt_profile_is_not_returning() {
        use crate::game::profile::JsonProfileStore;

        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path());
        std::fs::write(store.path_for("ada"), "{ not json").unwrap();

        let opened = Session::open(
            store.clone(),
            "ada",
            LearnerConfig::default(),
            StdRng::seed_from_u64(1),
        );
        assert!(matches!(opened, Err(SessionError::Profile(_))));

        let mut s = Session::open_or_reset(
            store,
            "ada",
            LearnerConfig::default(),
            StdRng::seed_from_u64(1),
        )
        .unwrap();
        assert!(!s.is_returning());
        assert_eq!(s.state(), &LearnerState::new("ada"));

        let mut out = Vec::new();
        s.run(&mut Cursor::new("5\n"), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("Welcome back"));
        assert!(s.store().load("ada").is_ok());
    }

    #[test]
    fn test_reset_keeps_healthy_profile() {
        let mut store = MemoryProfileStore::new();
        let mut state = LearnerState::new("ada");
        state.games_played = 3;
        state.total_attempts = 9;
        store.save(&state).unwrap();

        let s = Session::open_or_reset(
            store,
            "ada",
            LearnerConfig::default(),
            StdRng::seed_from_u64(1),
        )
        .unwrap();
        assert!(s.is_returning());
        assert_eq!(s.state().games_played, 3);
    }

    #[test]
    fn test_prompt_username_reprompts_on_bad_name() {
        let mut input = Cursor::new("Ada Lovelace\n../x\nada_lovelace\n");
        let mut out = Vec::new();
        let name = prompt_username(&mut input, &mut out).unwrap();
        assert_eq!(name, "ada_lovelace");
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Enter your username: ").count(), 3);
        assert!(text.contains("invalid username \"Ada Lovelace\""));
    }

    #[test]
    fn test_prompt_username_defaults() {
        let mut out = Vec::new();
        assert_eq!(prompt_username(&mut Cursor::new("\n"), &mut out).unwrap(), "Player");
        assert_eq!(prompt_username(&mut Cursor::new(""), &mut out).unwrap(), "Player");
        assert_eq!(prompt_username(&mut Cursor::new("  bob  \n"), &mut out).unwrap(), "bob");
    }
}
