//! Per-stage job counters.
//!
//! Counters are grouped by stage name and safe to bump from worker threads.
//! Elapsed phase times are recorded as `*_ms` counters next to the record
//! counts so a single report shows both.
//!
//! ```rust
//! use basketmap::mapreduce::JobCounters;
//!
//! let counters = JobCounters::new();
//! counters.increment("pair-counter", "map_input_records", 3);
//! counters.increment("pair-counter", "map_input_records", 2);
//! assert_eq!(counters.get("pair-counter", "map_input_records"), 5);
//! ```

use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

pub const MAP_INPUT_RECORDS: &str = "map_input_records";
pub const MAP_OUTPUT_RECORDS: &str = "map_output_records";
pub const COMBINE_OUTPUT_RECORDS: &str = "combine_output_records";
pub const SKIPPED_RECORDS: &str = "skipped";
pub const SPILLED_RUNS: &str = "spilled_runs";
pub const REDUCE_GROUPS: &str = "reduce_groups";
pub const REDUCE_OUTPUT_RECORDS: &str = "reduce_output_records";
pub const MAP_MS: &str = "map_ms";
pub const SHUFFLE_MS: &str = "shuffle_ms";
pub const REDUCE_MS: &str = "reduce_ms";

#[derive(Debug, Default)]
pub struct JobCounters {
    counts: DashMap<(&'static str, &'static str), u64>,
}

impl JobCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, group: &'static str, name: &'static str, by: u64) {
        if by == 0 {
            return;
        }
        *self.counts.entry((group, name)).or_insert(0) += by;
    }

    pub fn record_duration(&self, group: &'static str, name: &'static str, elapsed: Duration) {
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        *self.counts.entry((group, name)).or_insert(0) += millis;
    }

    pub fn get(&self, group: &str, name: &str) -> u64 {
        self.counts
            .iter()
            .find(|entry| entry.key().0 == group && entry.key().1 == name)
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }

    /// Total of one counter across all groups.
    pub fn total(&self, name: &str) -> u64 {
        self.counts
            .iter()
            .filter(|entry| entry.key().1 == name)
            .map(|entry| *entry.value())
            .sum()
    }

    pub fn reset(&self) {
        self.counts.clear();
    }

    /// Ordered copy of all counters.
    pub fn snapshot(&self) -> CounterReport {
        let mut groups: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        for entry in self.counts.iter() {
            let (group, name) = *entry.key();
            groups
                .entry(group.to_string())
                .or_default()
                .insert(name.to_string(), *entry.value());
        }
        CounterReport { groups }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CounterReport {
    pub groups: BTreeMap<String, BTreeMap<String, u64>>,
}

impl CounterReport {
    pub fn to_summary(&self) -> String {
        let mut lines = vec!["Job counters:".to_string()];
        for (group, counters) in &self.groups {
            lines.push(format!("  {group}"));
            for (name, value) in counters {
                lines.push(format!("    {name:<24} {value:>12}"));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_concurrent_increments() {
        let counters = JobCounters::new();
        (0..1000).into_par_iter().for_each(|_| {
            counters.increment("stage", MAP_INPUT_RECORDS, 1);
        });
        assert_eq!(counters.get("stage", MAP_INPUT_RECORDS), 1000);
    }

    #[test]
    fn test_zero_increment_creates_no_entry() {
        let counters = JobCounters::new();
        counters.increment("stage", SKIPPED_RECORDS, 0);
        assert!(counters.snapshot().groups.is_empty());
    }

    #[test]
    fn test_total_and_snapshot() {
        let counters = JobCounters::new();
        counters.increment("b-stage", SKIPPED_RECORDS, 2);
        counters.increment("a-stage", SKIPPED_RECORDS, 3);
        counters.record_duration("a-stage", MAP_MS, Duration::from_millis(15));

        assert_eq!(counters.total(SKIPPED_RECORDS), 5);

        let report = counters.snapshot();
        let groups: Vec<_> = report.groups.keys().cloned().collect();
        assert_eq!(groups, vec!["a-stage", "b-stage"]);
        assert_eq!(report.groups["a-stage"][MAP_MS], 15);

        let summary = report.to_summary();
        assert!(summary.starts_with("Job counters:"));
        assert!(summary.contains("a-stage"));
        assert!(summary.contains("skipped"));
    }

    #[test]
    fn test_reset() {
        let counters = JobCounters::new();
        counters.increment("stage", REDUCE_GROUPS, 4);
        counters.reset();
        assert_eq!(counters.get("stage", REDUCE_GROUPS), 0);
    }
}
