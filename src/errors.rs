//! Error types for basketmap jobs.
//!
//! Two levels exist:
//!
//! - [`RecordError`]: a single input record could not be mapped. Whether this
//!   aborts the run or is skipped and counted is decided by
//!   [`MalformedPolicy`](crate::config::MalformedPolicy).
//! - [`Error`]: anything that fails a whole stage or pipeline run.
//!
//! # Example
//!
//! ```rust
//! use basketmap::errors::{Error, RecordError};
//!
//! let record = RecordError::new("orders.csv", 3, "1,2022-10-31", "expected 3 fields, found 2");
//! let err: Error = record.into();
//! assert_eq!(err.category(), "Record");
//! assert!(err.to_string().contains("orders.csv:3"));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// A record that the map phase of a stage could not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed record at {origin}:{line}: {reason} (content: {content:?})")]
pub struct RecordError {
    /// Label of the input the record came from (file path or `<stdin>`)
    pub origin: String,
    /// 1-based line number within `origin`
    pub line: u64,
    /// The raw record text
    pub content: String,
    /// Why the record was rejected
    pub reason: String,
}

impl RecordError {
    pub fn new(
        origin: impl Into<String>,
        line: u64,
        content: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            line,
            content: content.into(),
            reason: reason.into(),
        }
    }
}

/// Main error type for basketmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Reading input or writing output failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// A malformed record under the fail-fast policy
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Configuration file or option problems
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Encoding or decoding a shuffle spill run failed
    #[error("Spill error: {0}")]
    Spill(String),

    /// A stage failed while running inside a pipeline
    #[error("Stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    /// Pipeline wiring problems (type mismatch between stages)
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// JSON encoding errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an I/O error with path context
    pub fn io_with_path(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Wrap an error with the name of the stage it happened in
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        match self {
            // Record errors already carry line context; keep them intact so
            // callers can still match on them.
            Self::Record(_) => self,
            other => Self::Stage {
                stage: stage.into(),
                message: other.to_string(),
            },
        }
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io { .. } => "I/O",
            Self::Record(_) => "Record",
            Self::Configuration(_) => "Config",
            Self::Spill(_) => "Spill",
            Self::Stage { .. } => "Stage",
            Self::Pipeline(_) => "Pipeline",
            Self::ThreadPool(_) => "ThreadPool",
            Self::Json(_) => "Json",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            message: source.to_string(),
            path: None,
            source,
        }
    }
}

impl From<postcard::Error> for Error {
    fn from(err: postcard::Error) -> Self {
        Self::Spill(err.to_string())
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
