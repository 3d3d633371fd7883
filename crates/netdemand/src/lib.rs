#![forbid(unsafe_code)]

//! netdemand public facade and prelude.
//!
//! Weighted demand distributions (vehicle-type and route distributions) for a
//! network-simulation editor, with validated mutation and undo/redo.
//!
//! # Crates
//!
//! - `netdemand-distribution` - the store, the mutation gateway and the
//!   concrete distribution elements
//! - `netdemand-undo` - reversible commands and the bounded history
//!
//! # Example
//!
//! ```
//! use netdemand::prelude::*;
//!
//! let config = EditorConfig::default();
//! let mut history = HistoryManager::new(config.history_config());
//! let mut routes = RouteDistribution::new(ElementId::new(1), "alternatives");
//!
//! routes.add_distribution_with_undo("north", "3", &mut history)?;
//! routes.add_distribution_with_undo("south", "1", &mut history)?;
//! assert_eq!(routes.attribute_distribution(), "north:3 south:1");
//!
//! history.undo();
//! assert_eq!(routes.attribute_distribution(), "north:3");
//! # Ok::<(), netdemand::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ConfigError, EditorConfig, HistoryPolicyConfig};
pub use error::{Error, Result};

pub use netdemand_distribution as distribution;
pub use netdemand_undo as undo;

/// Commonly used types.
pub mod prelude {
    pub use crate::config::EditorConfig;
    pub use crate::error::{Error, Result};
    pub use netdemand_distribution::{
        DemandDistribution, Distribution, DistributionEntry, DistributionError,
        DistributionKind, RouteDistribution, ValidationFailure, VTypeDistribution, Weight,
    };
    pub use netdemand_undo::{
        CommandBatch, CommandError, ElementId, HistoryConfig, HistoryManager, UndoableCmd,
    };
}
