//! Running a single [`MapReduce`] stage.
//!
//! Execution has three phases separated by barriers:
//!
//! 1. **Map**: input records are split into batches and mapped (in parallel
//!    when enabled). Each batch optionally runs the stage's combiner.
//! 2. **Shuffle**: all batch output is pushed into a [`ShuffleBuffer`], which
//!    may spill sorted runs to disk.
//! 3. **Reduce**: key groups are pulled from the shuffle in key order, in
//!    batches, and reduced (in parallel when enabled).
//!
//! Output order follows shuffle key order, so results do not depend on the
//! number of threads or the batch size.

use super::counters::{
    JobCounters, COMBINE_OUTPUT_RECORDS, MAP_INPUT_RECORDS, MAP_MS, MAP_OUTPUT_RECORDS,
    REDUCE_GROUPS, REDUCE_MS, REDUCE_OUTPUT_RECORDS, SHUFFLE_MS, SKIPPED_RECORDS, SPILLED_RUNS,
};
use super::job::MapReduce;
use super::shuffle::{ShuffleBuffer, SpillSettings};
use crate::config::{MalformedPolicy, ParallelConfig};
use crate::errors::{RecordError, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info_span, warn};

/// How stages are executed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOptions {
    pub parallel: ParallelConfig,
    pub on_malformed: MalformedPolicy,
    /// Run combiners of stages that provide one
    pub combine: bool,
    /// Spill the shuffle to disk past a threshold; `None` stays in memory
    pub spill: Option<SpillSettings>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            parallel: ParallelConfig::default(),
            on_malformed: MalformedPolicy::default(),
            combine: true,
            spill: None,
        }
    }
}

impl ExecutionOptions {
    pub fn sequential() -> Self {
        Self {
            parallel: ParallelConfig::sequential(),
            ..Self::default()
        }
    }

    pub fn with_combiner(mut self, combine: bool) -> Self {
        self.combine = combine;
        self
    }

    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    pub fn with_spill(mut self, spill: SpillSettings) -> Self {
        self.spill = Some(spill);
        self
    }
}

struct MapBatch<K, V> {
    pairs: Vec<(K, V)>,
    errors: Vec<RecordError>,
    emitted: usize,
}

/// Options, worker pool, and counters shared by every stage of a run.
pub struct ExecutionContext {
    options: ExecutionOptions,
    pool: Option<rayon::ThreadPool>,
    counters: JobCounters,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            options: ExecutionOptions::default(),
            pool: None,
            counters: JobCounters::new(),
        }
    }
}

impl ExecutionContext {
    pub fn new(options: ExecutionOptions) -> Result<Self> {
        let pool = options.parallel.build_pool()?;
        Ok(Self {
            options,
            pool,
            counters: JobCounters::new(),
        })
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    pub fn counters(&self) -> &JobCounters {
        &self.counters
    }

    /// Run one stage over `input` and return its reduce output.
    pub fn run<S: MapReduce>(&self, stage: &S, input: Vec<S::Input>) -> Result<Vec<S::Output>> {
        match &self.pool {
            Some(pool) => pool.install(|| self.run_stage(stage, input)),
            None => self.run_stage(stage, input),
        }
    }

    fn run_stage<S: MapReduce>(&self, stage: &S, input: Vec<S::Input>) -> Result<Vec<S::Output>> {
        let name = stage.name();
        let _span = info_span!("stage", name).entered();
        let batch_size = self.options.parallel.effective_batch_size();
        self.counters
            .increment(name, MAP_INPUT_RECORDS, input.len() as u64);

        let started = Instant::now();
        let batches = self.map_phase(stage, input, batch_size);
        self.counters.record_duration(name, MAP_MS, started.elapsed());

        self.handle_record_errors(name, &batches)?;

        let started = Instant::now();
        let mut shuffle = ShuffleBuffer::new(self.options.spill.clone());
        let mut emitted = 0usize;
        let mut shuffled = 0usize;
        for batch in batches {
            emitted += batch.emitted;
            for (key, value) in batch.pairs {
                shuffle.push(key, value)?;
                shuffled += 1;
            }
        }
        self.counters
            .increment(name, MAP_OUTPUT_RECORDS, emitted as u64);
        if self.combining(stage) {
            self.counters
                .increment(name, COMBINE_OUTPUT_RECORDS, shuffled as u64);
        }
        self.counters
            .increment(name, SPILLED_RUNS, shuffle.spilled_runs() as u64);
        let groups = shuffle.finish()?;
        self.counters
            .record_duration(name, SHUFFLE_MS, started.elapsed());

        let started = Instant::now();
        let mut outputs = Vec::new();
        let mut group_count = 0usize;
        let mut pending = Vec::with_capacity(batch_size);
        for group in groups {
            pending.push(group?);
            if pending.len() == batch_size {
                group_count += pending.len();
                outputs.extend(self.reduce_batch(stage, std::mem::take(&mut pending)));
            }
        }
        if !pending.is_empty() {
            group_count += pending.len();
            outputs.extend(self.reduce_batch(stage, pending));
        }
        self.counters.record_duration(name, REDUCE_MS, started.elapsed());
        self.counters
            .increment(name, REDUCE_GROUPS, group_count as u64);
        self.counters
            .increment(name, REDUCE_OUTPUT_RECORDS, outputs.len() as u64);

        debug!(
            "Stage {}: {} pairs emitted, {} shuffled, {} groups, {} outputs",
            name,
            emitted,
            shuffled,
            group_count,
            outputs.len()
        );
        Ok(outputs)
    }

    fn combining<S: MapReduce>(&self, stage: &S) -> bool {
        self.options.combine && stage.has_combiner()
    }

    fn map_phase<S: MapReduce>(
        &self,
        stage: &S,
        input: Vec<S::Input>,
        batch_size: usize,
    ) -> Vec<MapBatch<S::Key, S::Value>> {
        if self.options.parallel.enabled {
            input
                .into_par_iter()
                .chunks(batch_size)
                .map(|records| self.map_batch(stage, records))
                .collect()
        } else {
            into_batches(input, batch_size)
                .into_iter()
                .map(|records| self.map_batch(stage, records))
                .collect()
        }
    }

    fn map_batch<S: MapReduce>(
        &self,
        stage: &S,
        records: Vec<S::Input>,
    ) -> MapBatch<S::Key, S::Value> {
        let mut pairs = Vec::new();
        let mut errors = Vec::new();
        for record in records {
            match stage.map(record) {
                Ok(mut emitted) => pairs.append(&mut emitted),
                Err(e) => errors.push(e),
            }
        }

        let emitted = pairs.len();
        if self.combining(stage) {
            pairs = combine_pairs(stage, pairs);
        }
        MapBatch {
            pairs,
            errors,
            emitted,
        }
    }

    fn handle_record_errors<K, V>(
        &self,
        stage: &'static str,
        batches: &[MapBatch<K, V>],
    ) -> Result<()> {
        let errors: Vec<&RecordError> = batches
            .iter()
            .flat_map(|batch| batch.errors.iter())
            .collect();
        let Some(first) = errors.first() else {
            return Ok(());
        };

        match self.options.on_malformed {
            MalformedPolicy::FailFast => Err((*first).clone().into()),
            MalformedPolicy::Skip => {
                for error in &errors {
                    warn!("Skipping record in stage {}: {}", stage, error);
                }
                self.counters
                    .increment(stage, SKIPPED_RECORDS, errors.len() as u64);
                Ok(())
            }
        }
    }

    fn reduce_batch<S: MapReduce>(
        &self,
        stage: &S,
        groups: Vec<(S::Key, Vec<S::Value>)>,
    ) -> Vec<S::Output> {
        if self.options.parallel.enabled {
            groups
                .into_par_iter()
                .flat_map_iter(|(key, values)| stage.reduce(key, values))
                .collect()
        } else {
            groups
                .into_iter()
                .flat_map(|(key, values)| stage.reduce(key, values))
                .collect()
        }
    }
}

/// Group one batch's pairs by key and run the stage's combiner on each group.
fn combine_pairs<S: MapReduce>(stage: &S, pairs: Vec<(S::Key, S::Value)>) -> Vec<(S::Key, S::Value)> {
    let mut grouped: BTreeMap<S::Key, Vec<S::Value>> = BTreeMap::new();
    for (key, value) in pairs {
        grouped.entry(key).or_default().push(value);
    }

    grouped
        .into_iter()
        .flat_map(|(key, values)| {
            let combined = stage.combine(&key, values);
            combined.into_iter().map(move |value| (key.clone(), value))
        })
        .collect()
}

fn into_batches<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut items = items.into_iter().peekable();
    while items.peek().is_some() {
        batches.push(items.by_ref().take(size).collect());
    }
    batches
}
