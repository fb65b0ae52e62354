//! Setup and initialization functions for CLI
//!
//! This module contains functions for initializing the runtime environment:
//! logging, and resolving execution options from config plus flags.

use super::args::ExecutionArgs;
use crate::config::BasketmapConfig;
use crate::errors::{Error, Result};
use crate::mapreduce::{ExecutionOptions, SpillSettings};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Map the `-v` count to a default filter directive.
pub fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides the `-v` count.
///
/// Logs go to stderr so they never mix with job output on stdout.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(verbosity)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2) // Show target module for -vv and above
        .with_thread_ids(verbosity >= 3) // Show thread IDs for -vvv
        .try_init();

    if installed.is_ok() {
        debug!("basketmap started with verbosity level: {}", verbosity);
    }
}

/// Combine file configuration with command-line overrides.
pub fn resolve_execution_options(
    config: &BasketmapConfig,
    args: &ExecutionArgs,
) -> Result<ExecutionOptions> {
    let mut parallel = config.parallel();
    if let Some(jobs) = args.jobs {
        parallel.max_concurrency = (jobs > 0).then_some(jobs);
    }
    if args.sequential {
        parallel.enabled = false;
    }
    if let Some(batch_size) = args.batch_size {
        if batch_size == 0 {
            return Err(Error::config("--batch-size must be at least 1"));
        }
        parallel.batch_size = Some(batch_size);
    }

    let shuffle = config.shuffle();
    let spill = match args.spill_threshold.or(shuffle.spill_threshold) {
        Some(0) => return Err(Error::config("spill threshold must be at least 1")),
        Some(threshold) => Some(SpillSettings {
            threshold,
            dir: args.spill_dir.clone().or(shuffle.spill_dir),
        }),
        None => None,
    };

    Ok(ExecutionOptions {
        parallel,
        on_malformed: args
            .on_malformed
            .unwrap_or(config.pipeline().on_malformed),
        combine: shuffle.combine && !args.no_combiner,
        spill,
    })
}
