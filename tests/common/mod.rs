// Test utility module for basketmap integration tests
#![allow(dead_code)]

use basketmap::basket::{MaxCooccurrenceSelector, PairCounter, SessionGrouper};
use basketmap::config::TiePolicy;
use basketmap::core::{Cooccurrence, InputLine, ItemPair, ItemSet, PairCount, SessionKey};
use basketmap::io::read_lines;
use basketmap::mapreduce::{ExecutionContext, ExecutionOptions};
use std::path::PathBuf;

/// Output of every stage of one co-occurrence run.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutputs {
    pub sessions: Vec<(SessionKey, ItemSet)>,
    pub pairs: Vec<(ItemPair, PairCount)>,
    pub selected: Vec<Cooccurrence>,
}

pub fn lines(text: &str) -> Vec<InputLine> {
    read_lines(text.as_bytes(), "test-input").expect("in-memory input is readable")
}

pub fn lines_from(records: &[String]) -> Vec<InputLine> {
    lines(&records.join("\n"))
}

/// Run the three stages one by one, keeping each stage's output.
pub fn run_stages(
    input: Vec<InputLine>,
    options: ExecutionOptions,
    policy: TiePolicy,
) -> basketmap::Result<StageOutputs> {
    let context = ExecutionContext::new(options)?;
    let sessions = context.run(&SessionGrouper, input)?;
    let pairs = context.run(&PairCounter, sessions.clone())?;
    let selected = context.run(&MaxCooccurrenceSelector::new(policy), pairs.clone())?;
    Ok(StageOutputs {
        sessions,
        pairs,
        selected,
    })
}

// Helper to create temporary input files
pub fn create_input_file(content: &str, name: &str) -> (tempfile::TempDir, PathBuf) {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join(name);
    std::fs::write(&file_path, content).expect("Failed to write input file");
    (temp_dir, file_path)
}

pub const HALLOWEEN_ORDERS: &str = "\
1,2022-10-31,chocolates
1,2022-10-31,pumpkins
1,2022-10-31,eggs
2,2022-10-31,chocolates
2,2022-10-31,candy corn
";
