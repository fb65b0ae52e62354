//! Shopping-basket co-occurrence analysis on a local map/reduce engine.
//!
//! Transaction lines (`customer_id,date,item`) flow through three chained
//! map/reduce stages: [`SessionGrouper`] collects each shopping session's
//! distinct items, [`PairCounter`] counts in how many sessions every ordered
//! item pair appears, and [`MaxCooccurrenceSelector`] keeps each item's most
//! frequent partner(s).
//!
//! ```rust
//! use basketmap::{cooccurrence_pipeline, read_lines, Cooccurrence, ExecutionContext, TiePolicy};
//! use std::sync::Arc;
//!
//! let input = "1,2022-10-31,eggs\n1,2022-10-31,milk\n";
//! let lines = read_lines(input.as_bytes(), "inline").unwrap();
//! let pipeline = cooccurrence_pipeline(Arc::new(ExecutionContext::default()), TiePolicy::All);
//!
//! let output = pipeline.execute(lines).unwrap();
//! assert_eq!(output[0], Cooccurrence::new("eggs", "milk", 1));
//! ```

pub mod basket;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod genres;
pub mod io;
pub mod mapreduce;
pub mod pipeline;

// Re-export commonly used types
pub use crate::basket::{MaxCooccurrenceSelector, PairCounter, SessionGrouper};
pub use crate::config::{BasketmapConfig, MalformedPolicy, ParallelConfig, TiePolicy};
pub use crate::core::{
    Cooccurrence, GenreCount, GenreYear, InputLine, ItemPair, ItemSet, PairCount, SessionKey,
    TransactionRecord,
};
pub use crate::errors::{Error, RecordError, Result};
pub use crate::genres::GenreCounter;
pub use crate::io::{read_inputs, read_lines, OutputFormat};
pub use crate::mapreduce::{ExecutionContext, ExecutionOptions, JobCounters, MapReduce};
pub use crate::pipeline::{
    cooccurrence_pipeline, genre_count_pipeline, BuiltPipeline, PipelineBuilder, StageTiming,
};
