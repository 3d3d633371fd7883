#![forbid(unsafe_code)]

//! History stack for undo/redo operations.
//!
//! [`HistoryManager`] keeps dual stacks of applied and reverted commands:
//!
//! - **Memory limits**: oldest commands evicted when the byte budget is exceeded
//! - **Depth limits**: maximum number of commands in undo history
//! - **Branch handling**: pushing a new command clears the redo stack
//!
//! # Invariants
//!
//! 1. `total_bytes` always equals the sum of `size_bytes()` over both stacks
//! 2. `undo_stack.len() <= config.max_depth` after any operation
//! 3. `total_bytes <= config.max_bytes` after any operation, if enforced
//! 4. A failed undo/redo leaves the command on the stack it came from
//!
//! ```text
//! push(cmd3)
//! ┌───────────────────────────────────────┐
//! │ Undo Stack: [cmd1, cmd2, cmd3]        │
//! │ Redo Stack: []                        │
//! └───────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────┐
//! │ Undo Stack: [cmd1]                    │
//! │ Redo Stack: [cmd3, cmd2]              │
//! └───────────────────────────────────────┘
//!
//! push(cmd4)  <-- new branch, clears redo
//! ┌───────────────────────────────────────┐
//! │ Undo Stack: [cmd1, cmd4]              │
//! │ Redo Stack: []                        │
//! └───────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::fmt;

use super::command::{CommandError, CommandMetadata, ElementId, UndoableCmd};

/// Configuration for the history manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of commands to keep in undo history.
    pub max_depth: usize,
    /// Maximum total bytes for all commands (0 = unlimited).
    pub max_bytes: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            max_bytes: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl HistoryConfig {
    /// Create a new configuration with custom limits.
    #[must_use]
    pub fn new(max_depth: usize, max_bytes: usize) -> Self {
        Self {
            max_depth,
            max_bytes,
        }
    }

    /// Create unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_bytes: 0,
        }
    }
}

/// Manager for undo/redo history.
pub struct HistoryManager {
    /// Commands available for undo (newest at back).
    undo_stack: VecDeque<Box<dyn UndoableCmd>>,
    /// Commands available for redo (newest at back).
    redo_stack: VecDeque<Box<dyn UndoableCmd>>,
    config: HistoryConfig,
    /// Total bytes used by all commands.
    total_bytes: usize,
}

impl fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("total_bytes", &self.total_bytes)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl HistoryManager {
    /// Create a new history manager with the given configuration.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
            total_bytes: 0,
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Push an already-applied command onto the undo stack.
    ///
    /// This clears the redo stack (new branch) and enforces limits.
    pub fn push(&mut self, cmd: Box<dyn UndoableCmd>) {
        self.clear_redo();

        tracing::trace!(
            target: "netdemand.undo",
            command = cmd.debug_name(),
            description = cmd.description(),
            target_element = ?cmd.target(),
            undo_depth = self.undo_stack.len() + 1,
            "command pushed"
        );

        self.total_bytes += cmd.size_bytes();
        self.undo_stack.push_back(cmd);

        self.enforce_limits();
    }

    /// Undo the last command.
    ///
    /// # Returns
    ///
    /// - `Some(Ok(description))` if undo succeeded
    /// - `Some(Err(error))` if undo failed (command remains on undo stack)
    /// - `None` if no commands to undo
    pub fn undo(&mut self) -> Option<Result<String, CommandError>> {
        let mut cmd = self.undo_stack.pop_back()?;
        let description = cmd.description().to_string();

        match cmd.revert() {
            Ok(()) => {
                self.redo_stack.push_back(cmd);
                tracing::trace!(
                    target: "netdemand.undo",
                    description = %description,
                    undo_depth = self.undo_stack.len(),
                    redo_depth = self.redo_stack.len(),
                    "undo"
                );
                Some(Ok(description))
            }
            Err(e) => {
                tracing::warn!(
                    target: "netdemand.undo",
                    description = %description,
                    error = %e,
                    "undo failed"
                );
                self.undo_stack.push_back(cmd);
                Some(Err(e))
            }
        }
    }

    /// Redo the last undone command.
    ///
    /// # Returns
    ///
    /// - `Some(Ok(description))` if redo succeeded
    /// - `Some(Err(error))` if redo failed (command remains on redo stack)
    /// - `None` if no commands to redo
    pub fn redo(&mut self) -> Option<Result<String, CommandError>> {
        let mut cmd = self.redo_stack.pop_back()?;
        let description = cmd.description().to_string();

        match cmd.redo() {
            Ok(()) => {
                self.undo_stack.push_back(cmd);
                tracing::trace!(
                    target: "netdemand.undo",
                    description = %description,
                    undo_depth = self.undo_stack.len(),
                    redo_depth = self.redo_stack.len(),
                    "redo"
                );
                Some(Ok(description))
            }
            Err(e) => {
                tracing::warn!(
                    target: "netdemand.undo",
                    description = %description,
                    error = %e,
                    "redo failed"
                );
                self.redo_stack.push_back(cmd);
                Some(Err(e))
            }
        }
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Get the undo stack depth.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the redo stack depth.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Get the description of the next undo command.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description())
    }

    /// Metadata of the next undo command, including who issued it.
    #[must_use]
    pub fn next_undo_metadata(&self) -> Option<&CommandMetadata> {
        self.undo_stack.back().map(|c| c.metadata())
    }

    /// Get total memory usage in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.total_bytes
    }

    /// Get the current configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Drop every command that edits `target`, from both stacks.
    ///
    /// Called when an element is deleted: its commands can no longer run,
    /// and commands for other elements do not depend on them. Returns the
    /// number of commands dropped.
    pub fn forget_target(&mut self, target: ElementId) -> usize {
        let before = self.undo_stack.len() + self.redo_stack.len();
        let mut freed = 0usize;
        for stack in [&mut self.undo_stack, &mut self.redo_stack] {
            stack.retain(|cmd| {
                let keep = cmd.target() != Some(target);
                if !keep {
                    freed += cmd.size_bytes();
                }
                keep
            });
        }
        self.total_bytes = self.total_bytes.saturating_sub(freed);

        let dropped = before - (self.undo_stack.len() + self.redo_stack.len());
        if dropped > 0 {
            tracing::debug!(
                target: "netdemand.undo",
                element = %target,
                dropped,
                "history entries for element dropped"
            );
        }
        dropped
    }

    fn release(&mut self, cmd: &dyn UndoableCmd) {
        self.total_bytes = self.total_bytes.saturating_sub(cmd.size_bytes());
    }

    fn clear_redo(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }
        tracing::trace!(
            target: "netdemand.undo",
            cleared = self.redo_stack.len(),
            "redo stack cleared"
        );
        let stale: Vec<_> = self.redo_stack.drain(..).collect();
        for cmd in stale {
            self.release(&*cmd);
        }
    }

    fn over_budget(&self) -> bool {
        self.config.max_bytes > 0 && self.total_bytes > self.config.max_bytes
    }

    /// Evict from the old end until depth and byte limits hold.
    ///
    /// The byte budget takes redo entries before undo entries.
    fn enforce_limits(&mut self) {
        let mut evicted = 0usize;
        while self.undo_stack.len() > self.config.max_depth || self.over_budget() {
            let victim = if self.undo_stack.len() > self.config.max_depth {
                self.undo_stack.pop_front()
            } else {
                self.redo_stack
                    .pop_front()
                    .or_else(|| self.undo_stack.pop_front())
            };
            let Some(cmd) = victim else { break };
            self.release(&*cmd);
            evicted += 1;
        }

        if evicted > 0 {
            tracing::trace!(
                target: "netdemand.undo",
                evicted,
                total_bytes = self.total_bytes,
                "history limits enforced"
            );
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
