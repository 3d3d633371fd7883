#![forbid(unsafe_code)]

//! Distribution members: keys and weights.

use std::fmt;

use crate::error::{Result, ValidationFailure};

/// Characters that may not appear in a member key.
///
/// The attribute string is written into an XML attribute and split on
/// whitespace, so whitespace and XML-reserved characters are rejected.
const FORBIDDEN_KEY_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Check that `key` can be stored and round-tripped.
pub fn validate_key(key: &str) -> Result<(), ValidationFailure> {
    if key.is_empty() {
        return Err(ValidationFailure::EmptyKey);
    }
    if let Some(ch) = key
        .chars()
        .find(|c| c.is_whitespace() || FORBIDDEN_KEY_CHARS.contains(c))
    {
        return Err(ValidationFailure::InvalidKey {
            key: key.to_string(),
            ch,
        });
    }
    Ok(())
}

/// A member weight.
///
/// Keeps the text it was parsed from so serialization (and therefore undo)
/// reproduces it verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Weight {
    raw: String,
    value: f64,
}

impl Weight {
    /// Parse a weight from text. Accepts finite values `>= 0`.
    pub fn parse(text: &str) -> Result<Self, ValidationFailure> {
        let invalid = || ValidationFailure::InvalidWeight {
            value: text.to_string(),
        };
        let value: f64 = text.parse().map_err(|_| invalid())?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid());
        }
        Ok(Self {
            raw: text.to_string(),
            value,
        })
    }

    /// The numeric value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The text the weight was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One `(key, weight)` pair of a distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionEntry {
    key: String,
    weight: Weight,
}

impl DistributionEntry {
    /// Build an entry from already-validated text.
    ///
    /// Malformed input is reported as [`crate::DistributionError::InvalidArgument`].
    pub fn new(key: impl Into<String>, weight: &str) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;
        let weight = Weight::parse(weight)?;
        Ok(Self { key, weight })
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn weight(&self) -> &Weight {
        &self.weight
    }

    /// Approximate heap + inline size, for history memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.key.len() + self.weight.raw.len()
    }
}

impl fmt::Display for DistributionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.weight)
    }
}
