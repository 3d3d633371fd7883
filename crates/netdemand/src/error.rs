#![forbid(unsafe_code)]

//! Top-level error for netdemand applications.
//!
//! Each variant wraps the error type of one subsystem so callers can match
//! on what matters and let the rest propagate with `?`.

use netdemand_distribution::DistributionError;
use netdemand_undo::CommandError;

use crate::config::ConfigError;

/// Unified error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A distribution edit or attribute parse failed.
    #[error("distribution: {0}")]
    Distribution(#[from] DistributionError),
    /// An undo or redo could not be replayed.
    #[error("history: {0}")]
    History(#[from] CommandError),
    /// Configuration could not be loaded.
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    /// Logging could not be initialised.
    #[error("logging: {0}")]
    Logging(String),
}

impl Error {
    /// True if the error points at a UI/state bug rather than bad input.
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        match self {
            Self::Distribution(e) => e.is_structural(),
            Self::History(CommandError::StateDrift { .. }) => true,
            _ => false,
        }
    }
}

/// Standard result type for netdemand APIs.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_and_classification() {
        let err: Error = DistributionError::KeyNotFound { key: "bus".into() }.into();
        assert!(err.is_programming_error());
        assert_eq!(err.to_string(), "distribution: distribution has no member 'bus'");

        let err: Error = DistributionError::Malformed {
            index: 0,
            token: "bus".into(),
        }
        .into();
        assert!(!err.is_programming_error());

        let err: Error = CommandError::StateDrift {
            expected: "a".into(),
            actual: "b".into(),
        }
        .into();
        assert!(err.is_programming_error());

        let err: Error = ConfigError::Validation(vec!["x".into()]).into();
        assert!(!err.is_programming_error());
        assert_eq!(err.to_string(), "config: validation errors: x");
    }
}
