//! Configuration knobs for the learning engine.
//!
//! The learners never carry hidden constants for their control loops; the
//! target solve speed, exploration rate and learning rates all come from a
//! [`LearnerConfig`] supplied by the caller.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the adaptive engine.
///
/// # Example
/// ```
/// use adaptive_guess::learn::LearnerConfig;
///
/// let config = LearnerConfig::default();
/// assert_eq!(config.target_attempts, 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Number of attempts a well-calibrated round should take.
    ///
    /// Rounds solved slower than this widen the hot zone; faster ones tighten it.
    pub target_attempts: u32,

    /// Exploration probability for hint style selection.
    ///
    /// Recommended range: 0.1 - 0.2. Zero means pure exploitation once any
    /// style has been tried.
    pub epsilon: f64,

    /// Step size for the hot/cold threshold, in `(0, 1]`.
    pub threshold_learning_rate: f64,

    /// Step size for the number-picking bias, in `(0, 1]`.
    pub bias_learning_rate: f64,

    /// Fraction of the search window used to jitter reverse-mode guesses.
    ///
    /// Zero keeps guesses exactly at the interpolated bias point.
    pub reverse_jitter: f64,

    /// Feed the position of each forward-mode guess into the bias estimator.
    pub learn_bias_from_guesses: bool,

    /// Random seed for reproducibility.
    ///
    /// If `None`, a random seed is drawn from the OS.
    pub seed: Option<u64>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            target_attempts: 3,
            epsilon: 0.1,
            threshold_learning_rate: 0.05,
            bias_learning_rate: 0.1,
            reverse_jitter: 0.0,
            learn_bias_from_guesses: true,
            seed: None,
        }
    }
}

impl LearnerConfig {
    /// Create a LearnerConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slow-moving configuration: small steps, little exploration.
    pub fn cautious() -> Self {
        Self {
            epsilon: 0.05,
            threshold_learning_rate: 0.02,
            bias_learning_rate: 0.05,
            ..Default::default()
        }
    }

    /// Fast-moving configuration: larger steps and more exploration.
    pub fn exploratory() -> Self {
        Self {
            epsilon: 0.2,
            threshold_learning_rate: 0.1,
            bias_learning_rate: 0.2,
            reverse_jitter: 0.05,
            ..Default::default()
        }
    }

    /// Builder method: set the target attempt count.
    pub fn with_target_attempts(mut self, target: u32) -> Self {
        self.target_attempts = target;
        self
    }

    /// Builder method: set exploration probability.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.clamp(0.0, 1.0);
        self
    }

    /// Builder method: set both learning rates.
    pub fn with_learning_rates(mut self, threshold: f64, bias: f64) -> Self {
        self.threshold_learning_rate = threshold;
        self.bias_learning_rate = bias;
        self
    }

    /// Builder method: set reverse-mode jitter.
    pub fn with_reverse_jitter(mut self, jitter: f64) -> Self {
        self.reverse_jitter = jitter;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_attempts == 0 {
            return Err(ConfigError::InvalidTargetAttempts);
        }

        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }

        for (name, rate) in [
            ("threshold", self.threshold_learning_rate),
            ("bias", self.bias_learning_rate),
        ] {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(ConfigError::InvalidLearningRate(name, rate));
            }
        }

        if !(0.0..=1.0).contains(&self.reverse_jitter) {
            return Err(ConfigError::InvalidJitter(self.reverse_jitter));
        }

        Ok(())
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Target attempts must be at least 1.
    #[error("target_attempts must be at least 1")]
    InvalidTargetAttempts,
    /// Exploration probability is out of range [0, 1].
    #[error("exploration probability {0} is out of range [0, 1]")]
    InvalidEpsilon(f64),
    /// Learning rate is out of range (0, 1].
    #[error("{0} learning rate {1} is out of range (0, 1]")]
    InvalidLearningRate(&'static str, f64),
    /// Jitter fraction is out of range [0, 1].
    #[error("reverse jitter {0} is out of range [0, 1]")]
    InvalidJitter(f64),
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid JSON for this struct.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
