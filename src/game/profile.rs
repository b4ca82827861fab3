//! Persistence of per-player learning state.
//!
//! A [`ProfileStore`] loads and saves whole [`LearnerState`] records keyed by
//! username. Two implementations are provided:
//!
//! - [`JsonProfileStore`]: one pretty-printed `user_<name>.json` file per player
//! - [`MemoryProfileStore`]: an in-process map, for tests and simulation

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::learn::LearnerState;

/// Longest accepted username.
const MAX_USERNAME_LEN: usize = 64;

/// Errors from loading or saving a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Reading or writing the backing file failed.
    #[error("profile I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The record is not valid JSON for a profile.
    #[error("profile JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    /// The username cannot be used as a profile key.
    #[error("invalid username {0:?}: use 1-64 letters, digits, '-' or '_'")]
    InvalidUsername(String),

    /// The record parsed but breaks a state invariant.
    #[error("profile for {username} is corrupt: {reason}")]
    Corrupt {
        /// Profile owner
        username: String,
        /// First invariant found broken
        reason: String,
    },
}

/// Load/save access to per-player learning state.
///
/// Both operations are whole-record and synchronous. At most one session
/// writes a given username at a time.
pub trait ProfileStore {
    /// Load the state for `username`, or a fresh default if none is stored.
    fn load(&self, username: &str) -> Result<LearnerState, ProfileError>;

    /// Persist `state` under `state.username`, replacing any previous record.
    fn save(&mut self, state: &LearnerState) -> Result<(), ProfileError>;

    /// Whether a record exists for `username`.
    fn exists(&self, username: &str) -> bool;
}

/// Check that `username` is safe to use as a key and a file name.
pub fn validate_username(username: &str) -> Result<(), ProfileError> {
    let ok = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ProfileError::InvalidUsername(username.to_string()))
    }
}

fn check_loaded(username: &str, state: LearnerState) -> Result<LearnerState, ProfileError> {
    if state.username != username {
        return Err(ProfileError::Corrupt {
            username: username.to_string(),
            reason: format!("record belongs to {}", state.username),
        });
    }
    if let Err(reason) = state.validate() {
        warn!(user = username, reason = reason.as_str(), "rejecting corrupt profile");
        return Err(ProfileError::Corrupt {
            username: username.to_string(),
            reason,
        });
    }
    Ok(state)
}

/// Stores each profile as `user_<name>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    dir: PathBuf,
}

impl JsonProfileStore {
    /// Use `dir` as the profile directory. It is created on first save.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Profile directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds (or would hold) the profile for `username`.
    pub fn path_for(&self, username: &str) -> PathBuf {
        self.dir.join(format!("user_{}.json", username))
    }
}

impl ProfileStore for JsonProfileStore {
    fn load(&self, username: &str) -> Result<LearnerState, ProfileError> {
        validate_username(username)?;
        let path = self.path_for(username);
        if !path.exists() {
            debug!(user = username, "no stored profile, using defaults");
            return Ok(LearnerState::new(username));
        }

        let content = fs::read_to_string(&path)?;
        let state: LearnerState = serde_json::from_str(&content)?;
        debug!(user = username, path = %path.display(), "profile loaded");
        check_loaded(username, state)
    }

    fn save(&mut self, state: &LearnerState) -> Result<(), ProfileError> {
        validate_username(&state.username)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(&state.username);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(state)?;
        {
            let mut file = File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;

        debug!(user = %state.username, path = %path.display(), "profile saved");
        Ok(())
    }

    fn exists(&self, username: &str) -> bool {
        validate_username(username).is_ok() && self.path_for(username).exists()
    }
}

/// Keeps profiles in memory as serialized JSON, so loads see exactly what a
/// file round-trip would produce.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    records: FxHashMap<String, String>,
}

impl MemoryProfileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no profile is stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self, username: &str) -> Result<LearnerState, ProfileError> {
        validate_username(username)?;
        match self.records.get(username) {
            Some(json) => check_loaded(username, serde_json::from_str(json)?),
            None => Ok(LearnerState::new(username)),
        }
    }

    fn save(&mut self, state: &LearnerState) -> Result<(), ProfileError> {
        validate_username(&state.username)?;
        let json = serde_json::to_string(state)?;
        self.records.insert(state.username.clone(), json);
        Ok(())
    }

    fn exists(&self, username: &str) -> bool {
        self.records.contains_key(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learn::{HintStyle, LearnerConfig, RoundOutcome};

    fn trained_state(name: &str) -> LearnerState {
        let config = LearnerConfig::default();
        let mut state = LearnerState::new(name);
        for (attempts, style) in [
            (7, HintStyle::HotCold),
            (2, HintStyle::Range),
            (3, HintStyle::HigherLower),
            (11, HintStyle::HotCold),
        ] {
            state
                .record_round(&RoundOutcome::solved(attempts, style), &config)
                .unwrap();
        }
        state.bias.update(83, 1, 100, 0.1).unwrap();
        state
    }

    #[test]
    fn test_json_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonProfileStore::new(dir.path());
        let state = trained_state("ada");

        store.save(&state).unwrap();
        assert!(store.exists("ada"));
        assert!(store.path_for("ada").ends_with("user_ada.json"));

        let loaded = store.load("ada").unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.threshold.k().to_bits(), state.threshold.k().to_bits());
        assert_eq!(loaded.bias.alpha().to_bits(), state.bias.alpha().to_bits());
    }

    #[test]
    fn test_clamped_values_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonProfileStore::new(dir.path());
        let mut state = LearnerState::new("edge");
        state.bias.update(10, 0, 10, 1.0).unwrap();
        for _ in 0..50 {
            state
                .record_round(
                    &RoundOutcome::solved(1, HintStyle::HotCold),
                    &LearnerConfig::default().with_learning_rates(1.0, 0.1),
                )
                .unwrap();
        }
        store.save(&state).unwrap();
        let loaded = store.load("edge").unwrap();
        assert_eq!(loaded.bias.alpha(), 1.0);
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_missing_profile_is_defaulted() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path().join("not-yet-created"));
        assert!(!store.exists("newbie"));
        assert_eq!(store.load("newbie").unwrap(), LearnerState::new("newbie"));
    }

    #[test]
    fn test_corrupt_profile_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path());
        fs::write(
            store.path_for("bad"),
            r#"{"username":"bad","games_played":0,"total_attempts":0,"k":0.2,"alpha":1.7}"#,
        )
        .unwrap();
        assert!(matches!(
            store.load("bad"),
            Err(ProfileError::Corrupt { .. })
        ));

        fs::write(store.path_for("garbled"), "{ nope").unwrap();
        assert!(matches!(store.load("garbled"), Err(ProfileError::Json(_))));
    }

    #[test]
    fn test_mismatched_owner_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonProfileStore::new(dir.path());
        store.save(&LearnerState::new("alice")).unwrap();
        fs::copy(store.path_for("alice"), store.path_for("bob")).unwrap();
        assert!(matches!(store.load("bob"), Err(ProfileError::Corrupt { .. })));
    }

    #[test]
    fn test_usernames_are_validated() {
        assert!(validate_username("player_1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("../etc/passwd").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());

        let mut store = MemoryProfileStore::new();
        assert!(matches!(
            store.save(&LearnerState::new("a b")),
            Err(ProfileError::InvalidUsername(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryProfileStore::new();
        let state = trained_state("grace");
        assert!(!store.exists("grace"));
        store.save(&state).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("grace").unwrap(), state);
        assert_eq!(store.load("other").unwrap(), LearnerState::new("other"));
    }
}
