//! Prebuilt pipelines.
//!
//! - [`cooccurrence_pipeline`]: transaction lines to each item's most
//!   frequent partner(s)
//! - [`genre_count_pipeline`]: movie lines to distinct titles per year and
//!   genre
//!
//! # Example Usage
//!
//! ```rust
//! use basketmap::config::TiePolicy;
//! use basketmap::io::read_lines;
//! use basketmap::mapreduce::{ExecutionContext, ExecutionOptions};
//! use basketmap::pipeline::cooccurrence_pipeline;
//! use std::sync::Arc;
//!
//! let context = Arc::new(ExecutionContext::new(ExecutionOptions::sequential()).unwrap());
//! let pipeline = cooccurrence_pipeline(context, TiePolicy::All);
//! let lines = read_lines("1,d,eggs\n1,d,milk\n".as_bytes(), "inline").unwrap();
//!
//! let (output, timings) = pipeline.execute_with_timing(lines).unwrap();
//! assert_eq!(output.len(), 2);
//! assert_eq!(timings.len(), 3);
//! ```

use super::stage::MapReduceStage;
use super::{BuiltPipeline, PipelineBuilder};
use crate::basket::{MaxCooccurrenceSelector, PairCounter, SessionGrouper};
use crate::config::TiePolicy;
use crate::core::{Cooccurrence, GenreCount, InputLine};
use crate::genres::GenreCounter;
use crate::mapreduce::ExecutionContext;
use std::sync::Arc;

/// SessionGrouper, then PairCounter, then MaxCooccurrenceSelector.
pub fn cooccurrence_pipeline(
    context: Arc<ExecutionContext>,
    tie_policy: TiePolicy,
) -> BuiltPipeline<Vec<InputLine>, Vec<Cooccurrence>> {
    PipelineBuilder::<Vec<InputLine>>::new()
        .stage(MapReduceStage::new(SessionGrouper, context.clone()))
        .stage(MapReduceStage::new(PairCounter, context.clone()))
        .stage(MapReduceStage::new(
            MaxCooccurrenceSelector::new(tie_policy),
            context,
        ))
        .with_progress()
        .build()
}

/// Single-stage pipeline counting distinct titles of the given genres.
pub fn genre_count_pipeline<G, S>(
    context: Arc<ExecutionContext>,
    genres: G,
) -> BuiltPipeline<Vec<InputLine>, Vec<GenreCount>>
where
    G: IntoIterator<Item = S>,
    S: Into<String>,
{
    PipelineBuilder::<Vec<InputLine>>::new()
        .stage(MapReduceStage::new(GenreCounter::new(genres), context))
        .with_progress()
        .build()
}
