// ptkit/src/logger.rs
//! Logger setup for the `ptkit` binary.
//!
//! Library code only emits `log` records; this module owns the `env_logger`
//! backend. `RUST_LOG` is honoured unless a level is forced by the caller.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Default filter when neither `RUST_LOG` nor a CLI flag selects one.
const DEFAULT_FILTER: &str = "warn";

/// Initializes the global logger. Safe to call more than once; later calls
/// are ignored.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder
        .target(Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false);

    // A second init (tests, embedding) is not an error.
    let _ = builder.try_init();
}

/// Maps the global `--quiet` / `--debug` flags to a forced level.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}
