//! Configuration for basketmap jobs.
//!
//! Settings come from `.basketmap.toml` (searched from the current directory
//! upward, or named with `--config`) and are then overridden by CLI flags.

mod core;
mod loader;
mod parallel;
mod policy;

pub use self::core::{BasketmapConfig, GenresConfig, OutputConfig, PipelineConfig, ShuffleConfig};
pub use loader::{
    directory_ancestors, discover_config, load_config, load_config_from, parse_config,
    CONFIG_FILE_NAME,
};
pub use parallel::ParallelConfig;
pub use policy::{MalformedPolicy, TiePolicy};

/// Contents written by `basketmap init`.
pub const DEFAULT_CONFIG: &str = r#"# Basketmap Configuration

[parallel]
enabled = true
# max_concurrency = 8
batch_size = 1024

[shuffle]
combine = true
# Spill sorted runs to disk once this many key/value pairs are buffered.
# spill_threshold = 1000000
# spill_dir = "/var/tmp/basketmap"

[pipeline]
# "all" emits every tied partner, "smallest" keeps the first by name
tie_policy = "all"
# "skip" counts and drops malformed lines, "fail-fast" aborts on the first one
on_malformed = "skip"

[output]
format = "tsv"

[genres]
include = ["Western", "Sci-Fi"]
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_template_parses() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert!(config.parallel().enabled);
        assert_eq!(config.pipeline(), PipelineConfig::default());
        assert_eq!(config.genres(), GenresConfig::default());
    }
}
