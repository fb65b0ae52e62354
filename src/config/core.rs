use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::parallel::ParallelConfig;
use super::policy::{MalformedPolicy, TiePolicy};
use crate::io::output::OutputFormat;

/// Root configuration structure for basketmap
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BasketmapConfig {
    #[serde(default)]
    pub parallel: Option<ParallelConfig>,

    #[serde(default)]
    pub shuffle: Option<ShuffleConfig>,

    #[serde(default)]
    pub pipeline: Option<PipelineConfig>,

    #[serde(default)]
    pub output: Option<OutputConfig>,

    #[serde(default)]
    pub genres: Option<GenresConfig>,
}

fn default_combine() -> bool {
    true
}

/// Shuffle behavior between map and reduce.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShuffleConfig {
    /// Run map-side combiners for stages that provide one (default: true)
    #[serde(default = "default_combine")]
    pub combine: bool,

    /// Buffered key/value pairs before a sorted run is spilled to disk.
    /// Unset keeps the whole shuffle in memory.
    #[serde(default)]
    pub spill_threshold: Option<usize>,

    /// Directory for spill runs (default: the system temp dir)
    #[serde(default)]
    pub spill_dir: Option<PathBuf>,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            combine: default_combine(),
            spill_threshold: None,
            spill_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PipelineConfig {
    #[serde(default)]
    pub tie_policy: TiePolicy,

    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_genres() -> Vec<String> {
    vec!["Western".to_string(), "Sci-Fi".to_string()]
}

/// Genres kept by the genre count job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenresConfig {
    #[serde(default = "default_genres")]
    pub include: Vec<String>,
}

impl Default for GenresConfig {
    fn default() -> Self {
        Self {
            include: default_genres(),
        }
    }
}

impl BasketmapConfig {
    pub fn parallel(&self) -> ParallelConfig {
        self.parallel.clone().unwrap_or_default()
    }

    pub fn shuffle(&self) -> ShuffleConfig {
        self.shuffle.clone().unwrap_or_default()
    }

    pub fn pipeline(&self) -> PipelineConfig {
        self.pipeline.clone().unwrap_or_default()
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output
            .as_ref()
            .map(|output| output.format)
            .unwrap_or_default()
    }

    pub fn genres(&self) -> GenresConfig {
        self.genres.clone().unwrap_or_default()
    }
}
