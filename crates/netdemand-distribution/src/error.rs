#![forbid(unsafe_code)]

//! Error taxonomy for distribution edits.
//!
//! Two kinds of failure are kept apart:
//!
//! - [`ValidationFailure`]: expected while the user is typing. Only returned by
//!   the validation functions, never by a mutation.
//! - [`DistributionError`]: a mutation could not be performed. For the
//!   structural variants this means the caller skipped validation or the UI
//!   and the store disagree.

use netdemand_undo::CommandError;

/// Why a proposed member does not pass validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("member key is empty")]
    EmptyKey,
    #[error("member key '{key}' contains forbidden character {ch:?}")]
    InvalidKey { key: String, ch: char },
    #[error("member '{key}' is already part of the distribution")]
    KeyExists { key: String },
    #[error("member '{key}' is not part of the distribution")]
    KeyMissing { key: String },
    #[error("'{value}' is not a finite non-negative weight")]
    InvalidWeight { value: String },
}

/// Errors returned by distribution mutations and the attribute parser.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistributionError {
    /// Add of a key that is already present.
    #[error("distribution already contains member '{key}'")]
    DuplicateKey { key: String },
    /// Remove of a key that is not present.
    #[error("distribution has no member '{key}'")]
    KeyNotFound { key: String },
    /// Malformed key or weight handed to a mutation.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
    /// Attribute-string token without a `key:weight` shape.
    #[error("malformed distribution token #{index}: '{token}'")]
    Malformed { index: usize, token: String },
    /// The history could not roll back a partially applied edit.
    #[error("history rollback failed: {0}")]
    History(#[from] CommandError),
}

impl DistributionError {
    /// True for errors that indicate misuse of the mutation primitives
    /// (as opposed to bad file input or history trouble).
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::DuplicateKey { .. } | Self::KeyNotFound { .. } | Self::InvalidArgument { .. }
        )
    }
}

impl From<ValidationFailure> for DistributionError {
    fn from(failure: ValidationFailure) -> Self {
        match failure {
            ValidationFailure::KeyExists { key } => Self::DuplicateKey { key },
            ValidationFailure::KeyMissing { key } => Self::KeyNotFound { key },
            other => Self::InvalidArgument {
                reason: other.to_string(),
            },
        }
    }
}

/// Result alias for distribution operations.
pub type Result<T, E = DistributionError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_classification() {
        assert!(DistributionError::DuplicateKey { key: "a".into() }.is_structural());
        assert!(DistributionError::KeyNotFound { key: "a".into() }.is_structural());
        assert!(
            DistributionError::InvalidArgument {
                reason: "x".into()
            }
            .is_structural()
        );
        assert!(
            !DistributionError::Malformed {
                index: 0,
                token: "x".into()
            }
            .is_structural()
        );
        assert!(!DistributionError::History(CommandError::Other("x".into())).is_structural());
    }

    #[test]
    fn validation_failure_maps_to_structural_error() {
        let err: DistributionError = ValidationFailure::KeyExists { key: "bus".into() }.into();
        assert_eq!(err, DistributionError::DuplicateKey { key: "bus".into() });

        let err: DistributionError = ValidationFailure::KeyMissing { key: "bus".into() }.into();
        assert_eq!(err, DistributionError::KeyNotFound { key: "bus".into() });

        let err: DistributionError = ValidationFailure::InvalidWeight { value: "-1".into() }.into();
        assert!(matches!(err, DistributionError::InvalidArgument { .. }));
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            DistributionError::KeyNotFound { key: "car".into() }.to_string(),
            "distribution has no member 'car'"
        );
        assert_eq!(
            ValidationFailure::InvalidKey {
                key: "a b".into(),
                ch: ' '
            }
            .to_string(),
            "member key 'a b' contains forbidden character ' '"
        );
    }
}
