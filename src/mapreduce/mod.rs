//! Local map/reduce engine.
//!
//! Jobs implement [`MapReduce`]; an [`ExecutionContext`] runs them with a
//! map phase, a key-ordered shuffle, and a reduce phase, collecting
//! [`JobCounters`] along the way. Chaining stages is the job of
//! [`crate::pipeline`].

pub mod counters;
pub mod executor;
pub mod job;
pub mod shuffle;

pub use counters::{CounterReport, JobCounters};
pub use executor::{ExecutionContext, ExecutionOptions};
pub use job::MapReduce;
pub use shuffle::{Groups, ShuffleBuffer, SpillSettings};
