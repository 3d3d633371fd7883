#![forbid(unsafe_code)]

//! Logging setup.
//!
//! Library crates only emit `tracing` events; installing a subscriber is the
//! application's job. Event targets:
//!
//! | target                   | level  | what                                      |
//! |--------------------------|--------|-------------------------------------------|
//! | `netdemand.distribution` | DEBUG  | applied edit                              |
//! | `netdemand.distribution` | WARN   | rejected edit                             |
//! | `netdemand.distribution` | ERROR  | compound edit left partially applied      |
//! | `netdemand.undo`         | TRACE  | push, undo, redo, eviction                |
//! | `netdemand.undo`         | DEBUG  | commands of a dropped element discarded   |
//! | `netdemand.undo`         | WARN   | failed undo/redo, incomplete rollback     |

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Environment variable read by [`init_tracing_from_env`].
pub const LOG_ENV_VAR: &str = "NETDEMAND_LOG";

/// Default filter when nothing else is configured.
pub const DEFAULT_FILTER: &str = "warn,netdemand=info";

/// Install a global `fmt` subscriber with the given filter directives.
///
/// Fails if the directives do not parse or a global subscriber is already set.
pub fn init_tracing(directives: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directives).map_err(|e| Error::Logging(e.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Install a global subscriber filtered by `NETDEMAND_LOG`, falling back to
/// [`DEFAULT_FILTER`].
pub fn init_tracing_from_env() -> Result<()> {
    let directives = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    init_tracing(&directives)
}
