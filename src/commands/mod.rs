//! CLI command implementations.
//!
//! - **cooccur**: run the three-stage co-occurrence pipeline
//! - **genres**: run the genre count job
//! - **init**: write a default `.basketmap.toml`
//!
//! Job commands share [`run_job`]: load config, resolve execution options,
//! read input, execute a pipeline, write records, and report counters.

pub mod cooccur;
pub mod genres;
pub mod init;

pub use cooccur::run_cooccur;
pub use genres::run_genres;
pub use init::init_config;

use crate::cli::{resolve_execution_options, JobArgs};
use crate::config::{load_config, BasketmapConfig};
use crate::core::InputLine;
use crate::io::{create_output, read_inputs, write_records, OutputRecord};
use crate::mapreduce::counters::SKIPPED_RECORDS;
use crate::mapreduce::{CounterReport, ExecutionContext};
use crate::pipeline::{BuiltPipeline, StageTiming};
use anyhow::Result;
use std::sync::Arc;

/// What a finished job reports back to the command.
#[derive(Debug)]
pub struct JobSummary {
    pub records_written: usize,
    pub skipped: u64,
    pub counters: CounterReport,
    pub timings: Vec<StageTiming>,
}

pub fn run_job<R, F>(args: &JobArgs, build: F) -> Result<JobSummary>
where
    R: OutputRecord + 'static,
    F: FnOnce(Arc<ExecutionContext>, &BasketmapConfig) -> BuiltPipeline<Vec<InputLine>, Vec<R>>,
{
    let config = load_config(args.config.as_deref())?;
    let options = resolve_execution_options(&config, &args.execution)?;
    let format = args.format.unwrap_or_else(|| config.output_format());
    let context = Arc::new(ExecutionContext::new(options)?);

    let lines = read_inputs(&args.inputs)?;
    tracing::info!("Read {} input records", lines.len());

    let pipeline = build(Arc::clone(&context), &config);
    tracing::debug!("Pipeline stages: {}", pipeline.stage_names().join(" -> "));
    let (records, timings) = pipeline.execute_with_timing(lines)?;

    let output = create_output(args.output.as_deref())?;
    write_records(format, output, &records)?;

    let summary = JobSummary {
        records_written: records.len(),
        skipped: context.counters().total(SKIPPED_RECORDS),
        counters: context.counters().snapshot(),
        timings,
    };
    report(&summary, args.stats);
    Ok(summary)
}

fn report(summary: &JobSummary, show_stats: bool) {
    if summary.skipped > 0 {
        eprintln!("Skipped {} malformed record(s)", summary.skipped);
    }
    if show_stats {
        eprintln!("{}", summary.counters.to_summary());
        eprintln!("Stage timings:");
        for timing in &summary.timings {
            eprintln!("  {}", timing.format());
        }
    }
}
