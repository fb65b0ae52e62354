//! Shopping-basket co-occurrence stages.
//!
//! ```text
//! lines ──SessionGrouper──▶ (session, items) ──PairCounter──▶ (pair, count)
//!       ──MaxCooccurrenceSelector──▶ item → (partner, count)
//! ```
//!
//! Each stage consumes the previous stage's reduce output as its map input.
//! [`crate::pipeline::cooccurrence_pipeline`] wires them together.

pub mod pairs;
pub mod select;
pub mod session;

pub use pairs::{session_pairs, PairCounter};
pub use select::{select_most_frequent, MaxCooccurrenceSelector};
pub use session::SessionGrouper;
