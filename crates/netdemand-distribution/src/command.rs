#![forbid(unsafe_code)]

//! Reversible record of one applied store primitive.

use std::fmt;

use netdemand_undo::{CommandError, CommandMetadata, CommandResult, ElementId, UndoableCmd};

use crate::entry::DistributionEntry;
use crate::error::{DistributionError, Result};
use crate::store::{Distribution, DistributionHandle, WeakDistributionHandle};

/// A primitive change that has been applied to a store.
///
/// Both variants remember the index the entry had, so reverting puts the
/// store back exactly as it was, order included.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryChange {
    Inserted { index: usize, entry: DistributionEntry },
    Erased { index: usize, entry: DistributionEntry },
}

impl EntryChange {
    #[must_use]
    pub fn entry(&self) -> &DistributionEntry {
        match self {
            Self::Inserted { entry, .. } | Self::Erased { entry, .. } => entry,
        }
    }

    /// Perform this change on `store`.
    pub(crate) fn perform(&self, store: &mut Distribution) -> Result<()> {
        match self {
            Self::Inserted { index, entry } => {
                store.insert_entry_at(*index, entry.clone())?;
            }
            Self::Erased { entry, .. } => {
                store.erase_entry(entry.key())?;
            }
        }
        Ok(())
    }

    /// Perform the inverse of this change on `store`.
    pub(crate) fn undo(&self, store: &mut Distribution) -> Result<()> {
        match self {
            Self::Inserted { entry, .. } => {
                store.erase_entry(entry.key())?;
            }
            Self::Erased { index, entry } => {
                store.insert_entry_at(*index, entry.clone())?;
            }
        }
        Ok(())
    }
}

/// Undo-history entry for one add or remove.
///
/// Created already applied by the mutation gateway. The command does not keep
/// the element's store alive: once the element is dropped, applying or
/// reverting reports [`CommandError::TargetNotFound`].
pub struct EntryCmd {
    handle: WeakDistributionHandle,
    element: ElementId,
    change: EntryChange,
    metadata: CommandMetadata,
}

impl fmt::Debug for EntryCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryCmd")
            .field("element", &self.element)
            .field("change", &self.change)
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl EntryCmd {
    pub(crate) fn new(
        handle: &DistributionHandle,
        element: ElementId,
        change: EntryChange,
        metadata: CommandMetadata,
    ) -> Self {
        Self {
            handle: handle.downgrade(),
            element,
            change,
            metadata,
        }
    }

    #[must_use]
    pub fn change(&self) -> &EntryChange {
        &self.change
    }

    fn with_store(
        &self,
        f: impl FnOnce(&EntryChange, &mut Distribution) -> Result<()>,
    ) -> CommandResult {
        let handle = self
            .handle
            .upgrade()
            .ok_or(CommandError::TargetNotFound(self.element))?;
        handle
            .write(|store| f(&self.change, store))
            .map_err(|e| self.drift(e))
    }

    fn drift(&self, err: DistributionError) -> CommandError {
        CommandError::StateDrift {
            expected: self.change.entry().to_string(),
            actual: err.to_string(),
        }
    }
}

impl UndoableCmd for EntryCmd {
    fn apply(&mut self) -> CommandResult {
        self.with_store(EntryChange::perform)
    }

    fn revert(&mut self) -> CommandResult {
        self.with_store(EntryChange::undo)
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.change.entry().size_bytes() + self.metadata.size_bytes()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn target(&self) -> Option<ElementId> {
        Some(self.element)
    }

    fn debug_name(&self) -> &'static str {
        "EntryCmd"
    }
}
