//! Parallelism settings for the map and reduce phases.

use crate::errors::Result;
use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// Default number of records (map) or key groups (reduce) handed to one task
fn default_batch_size() -> usize {
    1024
}

fn default_batch_size_option() -> Option<usize> {
    Some(default_batch_size())
}

/// Configuration for parallel stage execution.
///
/// When enabled, map batches and reduce batches are processed on a rayon
/// thread pool. Output order never depends on these settings.
///
/// # Example
///
/// ```rust
/// use basketmap::config::ParallelConfig;
///
/// let config = ParallelConfig {
///     enabled: true,
///     max_concurrency: Some(4),
///     batch_size: Some(256),
/// };
/// assert_eq!(config.effective_batch_size(), 256);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Enable parallel processing (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Worker threads (default: rayon's global pool, one per core)
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Records or key groups per task (default: 1024)
    #[serde(default = "default_batch_size_option")]
    pub batch_size: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_concurrency: None,
            batch_size: Some(default_batch_size()),
        }
    }
}

impl ParallelConfig {
    /// Create a config with parallel processing disabled.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a config with a fixed number of worker threads.
    pub fn with_threads(threads: usize) -> Self {
        Self {
            max_concurrency: Some(threads),
            ..Default::default()
        }
    }

    /// Get the effective concurrency level.
    pub fn effective_concurrency(&self) -> usize {
        if !self.enabled {
            return 1;
        }
        self.max_concurrency
            .filter(|n| *n > 0)
            .unwrap_or_else(num_cpus)
    }

    /// Get the effective batch size; zero is treated as one.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or_else(default_batch_size).max(1)
    }

    /// Build a dedicated pool when a thread count is configured.
    ///
    /// Returns `None` when running sequentially or when the global pool
    /// should be used.
    pub fn build_pool(&self) -> Result<Option<rayon::ThreadPool>> {
        match self.max_concurrency {
            Some(threads) if self.enabled && threads > 0 => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("basketmap-worker-{i}"))
                    .build()?;
                Ok(Some(pool))
            }
            _ => Ok(None),
        }
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}
