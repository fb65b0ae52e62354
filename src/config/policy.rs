//! Policies that change job results rather than just performance.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// What to emit when several partners share an item's maximum count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TiePolicy {
    /// One record per tied partner, ordered by partner name
    #[default]
    All,
    /// Only the lexicographically smallest tied partner
    Smallest,
}

/// What to do with input records the map phase cannot interpret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedPolicy {
    /// Drop the record, count it, and keep going
    #[default]
    Skip,
    /// Abort the run at the first malformed record
    #[value(alias = "fail")]
    #[serde(alias = "fail")]
    FailFast,
}
