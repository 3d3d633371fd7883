#![forbid(unsafe_code)]

//! Weighted distributions for demand elements.
//!
//! Some demand elements are not a single vehicle type or route but a weighted
//! choice between several of them. This crate provides:
//!
//! - [`Distribution`] - the ordered `(key, weight)` store and its canonical
//!   attribute string (`"bus:2 car:1"`)
//! - [`DemandDistribution`] - validation and mutation, with or without an
//!   undo history
//! - [`VTypeDistribution`] / [`RouteDistribution`] - the concrete elements
//!
//! # Example
//!
//! ```
//! use netdemand_distribution::{DemandDistribution, VTypeDistribution};
//! use netdemand_undo::{ElementId, HistoryManager};
//!
//! let mut mix = VTypeDistribution::new(ElementId::new(1), "mix");
//! let mut history = HistoryManager::default();
//!
//! assert!(mix.is_valid_distribution("bus", "2"));
//! mix.add_distribution_with_undo("bus", "2", &mut history).unwrap();
//! mix.add_distribution("car", "1").unwrap();
//! assert_eq!(mix.attribute_distribution(), "bus:2 car:1");
//!
//! mix.remove_distribution("car").unwrap();
//! history.undo();
//! assert_eq!(mix.attribute_distribution(), "");
//! ```

pub mod command;
pub mod entry;
pub mod error;
pub mod gateway;
pub mod kind;
pub mod store;

pub use command::{EntryChange, EntryCmd};
pub use entry::{DistributionEntry, Weight, validate_key};
pub use error::{DistributionError, Result, ValidationFailure};
pub use gateway::DemandDistribution;
pub use kind::{DistributionKind, RouteDistribution, VTypeDistribution};
pub use store::{
    Distribution, DistributionHandle, PAIR_SEPARATOR, WEIGHT_SEPARATOR, WeakDistributionHandle,
};
