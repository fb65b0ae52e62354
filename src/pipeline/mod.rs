//! Typed chaining of stages.
//!
//! Each stage's output feeds the next stage's input. Map/reduce jobs join a
//! pipeline through [`MapReduceStage`]; [`configs`] holds the pipelines the
//! CLI runs.

pub mod builder;
pub mod configs;
pub mod stage;

pub use builder::{BuiltPipeline, PipelineBuilder, StageTiming};
pub use configs::{cooccurrence_pipeline, genre_count_pipeline};
pub use stage::{MapReduceStage, Stage};
