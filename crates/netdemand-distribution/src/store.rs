#![forbid(unsafe_code)]

//! The distribution store.
//!
//! A [`Distribution`] is an ordered list of uniquely keyed, weighted members.
//! Insertion order is kept because it drives both the canonical attribute
//! string and the sampling scan.
//!
//! # Attribute grammar
//!
//! ```text
//! distribution := "" | pair (" " pair)*
//! pair         := key ":" weight
//! ```
//!
//! The serializer always emits single spaces. The parser accepts any run of
//! ASCII whitespace between pairs and splits each pair at its last `:`, so
//! keys may themselves contain colons.
//!
//! # Invariants
//!
//! 1. No two entries share a key
//! 2. Every weight is finite and `>= 0`
//! 3. `s.parse::<Distribution>()?.to_string() == s` for every canonical `s`

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use rand::Rng;

use crate::entry::{DistributionEntry, Weight};
use crate::error::{DistributionError, Result};

/// Separator between pairs in the canonical attribute string.
pub const PAIR_SEPARATOR: char = ' ';
/// Separator between key and weight inside a pair.
pub const WEIGHT_SEPARATOR: char = ':';

/// Ordered, uniquely keyed set of weighted members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    entries: Vec<DistributionEntry>,
}

impl Distribution {
    /// Create an empty distribution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a canonical attribute string.
    pub fn parse_attribute(text: &str) -> Result<Self> {
        text.parse()
    }

    /// The canonical attribute string.
    #[must_use]
    pub fn attribute_distribution(&self) -> String {
        self.to_string()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Index of `key` in insertion order.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key() == key)
    }

    /// Weight of `key`, if present.
    #[must_use]
    pub fn weight(&self, key: &str) -> Option<&Weight> {
        self.entries
            .iter()
            .find(|e| e.key() == key)
            .map(DistributionEntry::weight)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &DistributionEntry> {
        self.entries.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(DistributionEntry::key)
    }

    /// Sum of all weights.
    ///
    /// Saturates to infinity when the weights are individually valid but too
    /// large to add up. [`probability`](Self::probability) and
    /// [`pick`](Self::pick) do not go through this sum.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.weight().value()).sum()
    }

    /// Scale factor for the weights, with the sum of the scaled weights.
    ///
    /// The factor is `1` whenever the plain sum is finite, which keeps
    /// cumulative boundaries exact. Otherwise weights are divided by the
    /// largest one, so each lies in `[0, 1]` and the sum cannot overflow.
    /// `None` when no member has a positive weight.
    fn scaled_weights(&self) -> Option<(f64, f64)> {
        let total = self.total_weight();
        if total.is_finite() {
            return (total > 0.0).then_some((1.0, total));
        }
        let max = self
            .entries
            .iter()
            .map(|e| e.weight().value())
            .fold(0.0_f64, f64::max);
        let scaled = self.entries.iter().map(|e| e.weight().value() / max).sum();
        Some((max, scaled))
    }

    /// Normalized probability of `key`.
    ///
    /// `None` if the key is absent or the total weight is zero.
    #[must_use]
    pub fn probability(&self, key: &str) -> Option<f64> {
        let (max, total) = self.scaled_weights()?;
        self.weight(key).map(|w| w.value() / max / total)
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    /// Map `u` in `[0, 1)` onto a member by cumulative weight, scanning in
    /// insertion order.
    ///
    /// Returns `None` for an empty distribution or a zero total weight.
    /// Zero-weight members are never picked.
    #[must_use]
    pub fn pick(&self, u: f64) -> Option<&DistributionEntry> {
        let (max, total) = self.scaled_weights()?;
        let target = u.clamp(0.0, 1.0) * total;
        let mut cumulative = 0.0;
        for entry in &self.entries {
            cumulative += entry.weight().value() / max;
            if target < cumulative {
                return Some(entry);
            }
        }
        // Rounding can leave `target` at the very top of the range.
        self.entries.iter().rev().find(|e| e.weight().value() > 0.0)
    }

    /// Draw a member using `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&DistributionEntry> {
        self.pick(rng.random::<f64>())
    }

    // ========================================================================
    // Mutation primitives (gateway only)
    // ========================================================================

    /// Append `entry`. Returns its index.
    pub(crate) fn insert_entry(&mut self, entry: DistributionEntry) -> Result<usize> {
        let index = self.entries.len();
        self.insert_entry_at(index, entry)
    }

    /// Insert `entry` at `index` (clamped to the current length).
    pub(crate) fn insert_entry_at(
        &mut self,
        index: usize,
        entry: DistributionEntry,
    ) -> Result<usize> {
        if self.contains(entry.key()) {
            return Err(DistributionError::DuplicateKey {
                key: entry.key().to_string(),
            });
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        Ok(index)
    }

    /// Remove `key`. Returns the removed entry and the index it had.
    pub(crate) fn erase_entry(&mut self, key: &str) -> Result<(usize, DistributionEntry)> {
        let index = self
            .position(key)
            .ok_or_else(|| DistributionError::KeyNotFound {
                key: key.to_string(),
            })?;
        Ok((index, self.entries.remove(index)))
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, "{PAIR_SEPARATOR}")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl FromStr for Distribution {
    type Err = DistributionError;

    fn from_str(text: &str) -> Result<Self> {
        let mut distribution = Self::new();
        for (index, token) in text.split_ascii_whitespace().enumerate() {
            let malformed = || DistributionError::Malformed {
                index,
                token: token.to_string(),
            };
            let (key, weight) = token.rsplit_once(WEIGHT_SEPARATOR).ok_or_else(malformed)?;
            distribution.insert_entry(DistributionEntry::new(key, weight)?)?;
        }
        Ok(distribution)
    }
}

// ============================================================================
// Shared handle
// ============================================================================

/// Shared ownership of one element's distribution.
///
/// The owning element holds the handle. Commands recorded for it in the
/// history hold a [`WeakDistributionHandle`] and stop working once the
/// element is gone. Only the mutation gateway writes through it.
#[derive(Debug, Clone, Default)]
pub struct DistributionHandle(Arc<Mutex<Distribution>>);

impl DistributionHandle {
    #[must_use]
    pub fn new(distribution: Distribution) -> Self {
        Self(Arc::new(Mutex::new(distribution)))
    }

    /// Run `f` with read access.
    pub fn read<R>(&self, f: impl FnOnce(&Distribution) -> R) -> R {
        f(&self.lock())
    }

    /// Clone the current contents.
    #[must_use]
    pub fn snapshot(&self) -> Distribution {
        self.read(Clone::clone)
    }

    /// Run `f` with write access.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Distribution) -> R) -> R {
        f(&mut self.lock())
    }

    /// True if both handles point at the same distribution.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// A handle that does not keep the distribution alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakDistributionHandle {
        WeakDistributionHandle(Arc::downgrade(&self.0))
    }

    fn lock(&self) -> MutexGuard<'_, Distribution> {
        // Primitives never leave a partial edit behind, so a poisoned lock
        // still guards a valid distribution.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Non-owning counterpart of [`DistributionHandle`].
#[derive(Debug, Clone, Default)]
pub struct WeakDistributionHandle(Weak<Mutex<Distribution>>);

impl WeakDistributionHandle {
    /// The live handle, or `None` once every owner has been dropped.
    #[must_use]
    pub fn upgrade(&self) -> Option<DistributionHandle> {
        self.0.upgrade().map(DistributionHandle)
    }
}
