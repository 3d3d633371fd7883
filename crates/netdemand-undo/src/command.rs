#![forbid(unsafe_code)]

//! Reversible command infrastructure.
//!
//! This module provides the [`UndoableCmd`] trait implemented by every edit
//! that can be taken back, and [`CommandBatch`] for grouping several edits
//! into a single undo step.
//!
//! # Invariants
//!
//! - `apply()` followed by `revert()` restores the prior state exactly
//! - `revert()` followed by `redo()` restores the applied state exactly
//! - `size_bytes()` is accurate enough for memory budgeting
//!
//! # Failure Modes
//!
//! - **Stale target**: the element a command edits has been dropped
//!   - Mitigation: commands report [`CommandError::TargetNotFound`], and
//!     [`HistoryManager::forget_target`](crate::HistoryManager::forget_target)
//!     discards them
//! - **State drift**: the target was changed outside the history
//!   - Mitigation: commands report [`CommandError::StateDrift`] and the
//!     history leaves them on their stack
//! - **Partial rollback**: a batch step fails and an earlier step cannot be
//!   reverted either
//!   - Mitigation: the batch logs the revert failure and keeps counting the
//!     steps that are still applied

use std::fmt;
use std::time::Instant;

/// Identifier of the demand element a command edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Create a new element ID from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who or what triggered a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandSource {
    /// Direct user action in the editor.
    #[default]
    User,
    /// Whole-attribute replacement, as done when loading a demand file.
    Loader,
}

/// Metadata attached to every command for tracing and UI display.
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    /// Human-readable description for UI (e.g., "Add distribution member").
    pub description: String,
    /// When the command was created.
    pub timestamp: Instant,
    /// Who/what triggered the command.
    pub source: CommandSource,
}

impl CommandMetadata {
    /// Create new metadata with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            timestamp: Instant::now(),
            source: CommandSource::User,
        }
    }

    /// Set the command source.
    #[must_use]
    pub fn with_source(mut self, source: CommandSource) -> Self {
        self.source = source;
        self
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.description.len()
    }
}

impl Default for CommandMetadata {
    fn default() -> Self {
        Self::new("Unknown")
    }
}

/// Result of applying or reverting a command.
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur while applying or reverting a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Target element no longer exists.
    #[error("target element {0} not found")]
    TargetNotFound(ElementId),
    /// State has changed since the command was recorded.
    #[error("state drift: expected '{expected}', got '{actual}'")]
    StateDrift { expected: String, actual: String },
    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// A reversible command that can be reverted and replayed.
///
/// Commands capture everything needed to apply and revert an operation.
/// The history stores them boxed, so they must be `Send + Sync`.
pub trait UndoableCmd: Send + Sync {
    /// Apply the command's effect.
    fn apply(&mut self) -> CommandResult;

    /// Revert the command's effect.
    fn revert(&mut self) -> CommandResult;

    /// Apply the command again after it was reverted.
    fn redo(&mut self) -> CommandResult {
        self.apply()
    }

    /// Human-readable description for UI display.
    fn description(&self) -> &str {
        &self.metadata().description
    }

    /// Size of this command in bytes for memory budgeting.
    fn size_bytes(&self) -> usize;

    /// Get the command metadata.
    fn metadata(&self) -> &CommandMetadata;

    /// Get the target element ID, if any.
    fn target(&self) -> Option<ElementId> {
        None
    }

    /// Debug name of the command type.
    fn debug_name(&self) -> &'static str {
        "UndoableCmd"
    }
}

impl fmt::Debug for dyn UndoableCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("description", &self.description())
            .field("target", &self.target())
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

/// A batch of commands that apply and revert together.
///
/// Used for edits that are built from several primitive steps but should
/// appear as a single undo entry, such as changing a weight (remove + add).
pub struct CommandBatch {
    /// Commands in application order.
    commands: Vec<Box<dyn UndoableCmd>>,
    /// Batch metadata.
    metadata: CommandMetadata,
    /// Number of leading commands currently applied.
    applied_to: usize,
}

impl fmt::Debug for CommandBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBatch")
            .field("commands_count", &self.commands.len())
            .field("metadata", &self.metadata)
            .field("applied_to", &self.applied_to)
            .finish()
    }
}

impl CommandBatch {
    /// Create a new, empty command batch.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            commands: Vec::new(),
            metadata: CommandMetadata::new(description),
            applied_to: 0,
        }
    }

    /// Set the batch source.
    #[must_use]
    pub fn with_source(mut self, source: CommandSource) -> Self {
        self.metadata.source = source;
        self
    }

    /// Add a command that has not been applied yet.
    pub fn push(&mut self, cmd: Box<dyn UndoableCmd>) {
        self.commands.push(cmd);
    }

    /// Add a command that has already been applied.
    ///
    /// All earlier commands in the batch must also be applied.
    pub fn push_applied(&mut self, cmd: Box<dyn UndoableCmd>) {
        self.commands.push(cmd);
        self.applied_to = self.commands.len();
    }

    /// Number of commands in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Revert every applied command, newest first.
    ///
    /// Used to roll back a half-built batch when a later step fails.
    pub fn rollback(&mut self) -> CommandResult {
        self.revert()
    }
}

impl UndoableCmd for CommandBatch {
    fn apply(&mut self) -> CommandResult {
        for i in self.applied_to..self.commands.len() {
            if let Err(e) = self.commands[i].apply() {
                while self.applied_to > 0 {
                    let j = self.applied_to - 1;
                    if let Err(revert_err) = self.commands[j].revert() {
                        tracing::warn!(
                            target: "netdemand.undo",
                            batch = %self.metadata.description,
                            step = j,
                            error = %e,
                            revert_error = %revert_err,
                            "batch rollback incomplete"
                        );
                        break;
                    }
                    self.applied_to = j;
                }
                return Err(e);
            }
            self.applied_to = i + 1;
        }
        Ok(())
    }

    fn revert(&mut self) -> CommandResult {
        while self.applied_to > 0 {
            self.commands[self.applied_to - 1].revert()?;
            self.applied_to -= 1;
        }
        Ok(())
    }

    fn redo(&mut self) -> CommandResult {
        self.apply()
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.commands.iter().map(|c| c.size_bytes()).sum::<usize>()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn target(&self) -> Option<ElementId> {
        let first = self.commands.first()?.target()?;
        self.commands
            .iter()
            .all(|c| c.target() == Some(first))
            .then_some(first)
    }

    fn debug_name(&self) -> &'static str {
        "CommandBatch"
    }
}
