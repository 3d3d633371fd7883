#![forbid(unsafe_code)]

//! Mutation gateway: validation and (optionally undoable) edits.
//!
//! Every edit goes through one internal function, [`commit`], which applies a
//! primitive to the store and hands back the applied change as an
//! [`EntryCmd`]. The public entry points differ only in what happens to that
//! command: the direct variants drop it, the `_with_undo` variants push it
//! onto the caller's [`HistoryManager`].
//!
//! ```text
//! add_distribution(k, w)            ──┐
//!                                     ├─► commit() ─► store primitive
//! add_distribution_with_undo(k, w, h) ┘        │
//!                                              └─► EntryCmd ─► h.push()
//! ```
//!
//! Callers are expected to run [`DemandDistribution::is_valid_distribution`]
//! first. The mutation entry points do not second-guess their input: they
//! either perform exactly the requested edit or return the structural error
//! that prevented it, leaving the store and the history untouched.

use netdemand_undo::{
    CommandBatch, CommandMetadata, CommandSource, ElementId, HistoryManager, UndoableCmd,
};

use crate::command::{EntryChange, EntryCmd};
use crate::entry::{DistributionEntry, Weight, validate_key};
use crate::error::{DistributionError, Result, ValidationFailure};
use crate::kind::DistributionKind;
use crate::store::{Distribution, DistributionHandle};

const ADD_MEMBER: &str = "Add distribution member";
const REMOVE_MEMBER: &str = "Remove distribution member";

/// A primitive edit requested by the gateway.
#[derive(Debug, Clone)]
enum Mutation {
    Insert(DistributionEntry),
    Erase(String),
}

/// Apply `mutation` to `handle` and return the applied change as a command.
fn commit(
    handle: &DistributionHandle,
    element: ElementId,
    kind: DistributionKind,
    mutation: Mutation,
    metadata: CommandMetadata,
) -> Result<EntryCmd> {
    let applied = handle.write(|store| -> Result<EntryChange> {
        match mutation {
            Mutation::Insert(entry) => {
                let index = store.insert_entry(entry.clone())?;
                Ok(EntryChange::Inserted { index, entry })
            }
            Mutation::Erase(key) => {
                let (index, entry) = store.erase_entry(&key)?;
                Ok(EntryChange::Erased { index, entry })
            }
        }
    });

    match applied {
        Ok(change) => {
            tracing::debug!(
                target: "netdemand.distribution",
                element = %element,
                kind = kind.tag(),
                op = %metadata.description,
                key = change.entry().key(),
                weight = change.entry().weight().as_str(),
                "distribution member changed"
            );
            Ok(EntryCmd::new(handle, element, change, metadata))
        }
        Err(err) => Err(reject(element, kind, err)),
    }
}

fn reject(element: ElementId, kind: DistributionKind, err: DistributionError) -> DistributionError {
    tracing::warn!(
        target: "netdemand.distribution",
        element = %element,
        kind = kind.tag(),
        error = %err,
        structural = err.is_structural(),
        "distribution edit rejected"
    );
    err
}

/// Undo the applied part of `batch` after step `err` failed.
///
/// `err` is returned unless the rollback itself fails, in which case it is
/// logged here and the rollback failure is returned instead.
fn abort(
    element: ElementId,
    kind: DistributionKind,
    mut batch: CommandBatch,
    err: DistributionError,
) -> DistributionError {
    match batch.rollback() {
        Ok(()) => err,
        Err(rollback) => {
            tracing::error!(
                target: "netdemand.distribution",
                element = %element,
                kind = kind.tag(),
                error = %err,
                rollback_error = %rollback,
                "distribution edit left partially applied"
            );
            DistributionError::History(rollback)
        }
    }
}

/// Push `cmd` onto `history` if one was supplied.
fn record(cmd: Box<dyn UndoableCmd>, history: Option<&mut HistoryManager>) {
    if let Some(history) = history {
        history.push(cmd);
    }
}

/// Distribution behavior shared by every distribution-valued demand element.
///
/// Implementors provide identity and storage; validation and mutation come
/// with the trait.
pub trait DemandDistribution {
    /// Identity used as the command target in the undo history.
    fn element_id(&self) -> ElementId;

    /// Which kind of distribution this is.
    fn kind(&self) -> DistributionKind;

    /// Shared handle to the element's store.
    fn distribution_handle(&self) -> &DistributionHandle;

    /// Snapshot of the current contents.
    fn distribution(&self) -> Distribution {
        self.distribution_handle().snapshot()
    }

    /// Canonical attribute string of the current contents.
    fn attribute_distribution(&self) -> String {
        self.distribution_handle().read(Distribution::to_string)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check a proposed add and report why it would fail.
    fn validate_distribution(&self, key: &str, value: &str) -> Result<(), ValidationFailure> {
        validate_key(key)?;
        if self.distribution_handle().read(|d| d.contains(key)) {
            return Err(ValidationFailure::KeyExists {
                key: key.to_string(),
            });
        }
        Weight::parse(value)?;
        Ok(())
    }

    /// True if `add_distribution(key, value)` would succeed.
    fn is_valid_distribution(&self, key: &str, value: &str) -> bool {
        self.validate_distribution(key, value).is_ok()
    }

    /// Check a proposed remove and report why it would fail.
    fn validate_distribution_removal(&self, key: &str) -> Result<(), ValidationFailure> {
        if self.distribution_handle().read(|d| d.contains(key)) {
            Ok(())
        } else {
            Err(ValidationFailure::KeyMissing {
                key: key.to_string(),
            })
        }
    }

    /// True if `remove_distribution(key)` would succeed.
    fn is_valid_distribution_removal(&self, key: &str) -> bool {
        self.validate_distribution_removal(key).is_ok()
    }

    // ========================================================================
    // Add / remove
    // ========================================================================

    /// Add a member directly.
    fn add_distribution(&mut self, key: &str, value: &str) -> Result<()> {
        add_member(&*self, key, value, None)
    }

    /// Add a member and record the edit in `history`.
    fn add_distribution_with_undo(
        &mut self,
        key: &str,
        value: &str,
        history: &mut HistoryManager,
    ) -> Result<()> {
        add_member(&*self, key, value, Some(history))
    }

    /// Remove a member directly.
    fn remove_distribution(&mut self, key: &str) -> Result<()> {
        remove_member(&*self, key, None)
    }

    /// Remove a member and record the edit in `history`.
    fn remove_distribution_with_undo(
        &mut self,
        key: &str,
        history: &mut HistoryManager,
    ) -> Result<()> {
        remove_member(&*self, key, Some(history))
    }

    // ========================================================================
    // Compound edits
    // ========================================================================

    /// Change the weight of an existing member (remove + add).
    ///
    /// The member moves to the end of the order. With a history the two
    /// steps form a single undo entry.
    fn set_distribution_weight(
        &mut self,
        key: &str,
        value: &str,
        history: Option<&mut HistoryManager>,
    ) -> Result<()> {
        let element = self.element_id();
        let kind = self.kind();
        let entry = DistributionEntry::new(key, value).map_err(|e| reject(element, kind, e))?;
        let handle = self.distribution_handle();

        let removed = commit(
            handle,
            element,
            kind,
            Mutation::Erase(key.to_string()),
            CommandMetadata::new(REMOVE_MEMBER),
        )?;
        let mut batch = CommandBatch::new("Change distribution weight");
        batch.push_applied(Box::new(removed));

        match commit(
            handle,
            element,
            kind,
            Mutation::Insert(entry),
            CommandMetadata::new(ADD_MEMBER),
        ) {
            Ok(added) => batch.push_applied(Box::new(added)),
            Err(err) => return Err(abort(element, kind, batch, err)),
        }

        record(Box::new(batch), history);
        Ok(())
    }

    /// Replace the whole contents from an attribute string.
    ///
    /// This is the path a file loader takes. The string is parsed first; on
    /// a parse error nothing changes. With a history the replacement is a
    /// single undo entry tagged [`CommandSource::Loader`].
    fn set_attribute_distribution(
        &mut self,
        text: &str,
        history: Option<&mut HistoryManager>,
    ) -> Result<()> {
        let element = self.element_id();
        let kind = self.kind();
        let next = Distribution::parse_attribute(text).map_err(|e| reject(element, kind, e))?;
        let handle = self.distribution_handle();
        let current: Vec<String> = handle.read(|d| d.keys().map(str::to_string).collect());

        let mut batch = CommandBatch::new("Set distribution").with_source(CommandSource::Loader);
        let mutations = current
            .into_iter()
            .rev()
            .map(Mutation::Erase)
            .map(|m| (m, REMOVE_MEMBER))
            .chain(
                next.entries()
                    .cloned()
                    .map(Mutation::Insert)
                    .map(|m| (m, ADD_MEMBER)),
            );

        for (mutation, description) in mutations {
            let metadata = CommandMetadata::new(description).with_source(CommandSource::Loader);
            match commit(handle, element, kind, mutation, metadata) {
                Ok(cmd) => batch.push_applied(Box::new(cmd)),
                Err(err) => return Err(abort(element, kind, batch, err)),
            }
        }

        if !batch.is_empty() {
            record(Box::new(batch), history);
        }
        Ok(())
    }
}

fn add_member<D: DemandDistribution + ?Sized>(
    element: &D,
    key: &str,
    value: &str,
    history: Option<&mut HistoryManager>,
) -> Result<()> {
    let id = element.element_id();
    let kind = element.kind();
    let entry = DistributionEntry::new(key, value).map_err(|e| reject(id, kind, e))?;
    let cmd = commit(
        element.distribution_handle(),
        id,
        kind,
        Mutation::Insert(entry),
        CommandMetadata::new(ADD_MEMBER),
    )?;
    record(Box::new(cmd), history);
    Ok(())
}

fn remove_member<D: DemandDistribution + ?Sized>(
    element: &D,
    key: &str,
    history: Option<&mut HistoryManager>,
) -> Result<()> {
    let cmd = commit(
        element.distribution_handle(),
        element.element_id(),
        element.kind(),
        Mutation::Erase(key.to_string()),
        CommandMetadata::new(REMOVE_MEMBER),
    )?;
    record(Box::new(cmd), history);
    Ok(())
}
