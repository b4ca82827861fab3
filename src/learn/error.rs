//! Error types for the learning engine.

use thiserror::Error;

/// Errors returned by learner operations.
///
/// A rejected call never mutates the learner it was invoked on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LearnError {
    /// Malformed geometry or parameter passed to an operation.
    #[error("invalid input to {operation}: {message}")]
    InvalidInput {
        /// Operation that rejected the input
        operation: &'static str,
        /// What was wrong with it
        message: String,
    },
}

impl LearnError {
    /// Create an InvalidInput error.
    pub fn invalid_input(operation: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            operation,
            message: message.into(),
        }
    }
}

/// Check that a learning rate lies in `(0, 1]`.
pub(crate) fn check_learning_rate(operation: &'static str, rate: f64) -> Result<(), LearnError> {
    if rate.is_finite() && rate > 0.0 && rate <= 1.0 {
        Ok(())
    } else {
        Err(LearnError::invalid_input(
            operation,
            format!("learning rate {} is out of range (0, 1]", rate),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = LearnError::invalid_input("classify", "range_size must be positive");
        assert_eq!(
            err.to_string(),
            "invalid input to classify: range_size must be positive"
        );
    }

    #[test]
    fn test_learning_rate_bounds() {
        assert!(check_learning_rate("x", 0.05).is_ok());
        assert!(check_learning_rate("x", 1.0).is_ok());
        assert!(check_learning_rate("x", 0.0).is_err());
        assert!(check_learning_rate("x", 1.5).is_err());
        assert!(check_learning_rate("x", f64::NAN).is_err());
    }
}
