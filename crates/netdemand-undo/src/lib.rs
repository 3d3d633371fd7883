#![forbid(unsafe_code)]

//! Undo/redo command history for demand-element edits.
//!
//! Every edit the editor wants to be able to take back is recorded as a
//! reversible command. Commands are pushed onto a [`HistoryManager`] *after*
//! they have been applied; the manager then replays their inverse on undo and
//! the forward operation on redo, strictly in LIFO order.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       HistoryManager                        │
//! │  ┌──────────────────┐          ┌──────────────────┐         │
//! │  │   Undo Stack     │          │   Redo Stack     │         │
//! │  │  ┌────────────┐  │  undo()  │  ┌────────────┐  │         │
//! │  │  │ CommandN   │  │ ──────►  │  │ Command1   │  │         │
//! │  │  ├────────────┤  │          │  ├────────────┤  │         │
//! │  │  │ Command1   │  │  ◄────── │  │ CommandN   │  │         │
//! │  │  └────────────┘  │  redo()  │  └────────────┘  │         │
//! │  └──────────────────┘          └──────────────────┘         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use netdemand_undo::{HistoryManager, UndoableCmd};
//!
//! let mut history = HistoryManager::default();
//! let cmd = build_and_apply_some_edit()?;
//! history.push(Box::new(cmd));
//!
//! history.undo(); // reverts the edit
//! history.redo(); // applies it again
//! ```
//!
//! ## Commands and their elements
//!
//! A command outlives the call that created it, so it cannot borrow the
//! element it edits. Commands hold a non-owning handle to the state they
//! mutate plus the [`ElementId`] of the owning element. Once the element is
//! dropped the command reports [`CommandError::TargetNotFound`];
//! [`HistoryManager::forget_target`] removes such commands.
//!
//! ## Memory budget
//!
//! Every command reports its size via `size_bytes()`. The history evicts the
//! oldest commands once the depth or byte budget is exceeded.

pub mod command;
pub mod history;

pub use command::{
    CommandBatch, CommandError, CommandMetadata, CommandResult, CommandSource, ElementId,
    UndoableCmd,
};
pub use history::{HistoryConfig, HistoryManager};
