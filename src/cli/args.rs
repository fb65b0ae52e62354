use crate::config::{MalformedPolicy, TiePolicy};
use crate::io::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "basketmap")]
#[command(about = "Shopping-basket co-occurrence analysis on a local map/reduce engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find each item's most frequent basket partner(s)
    Cooccur {
        #[command(flatten)]
        job: JobArgs,

        /// How to report partners tied for the maximum count
        #[arg(long = "ties", value_enum)]
        tie_policy: Option<TiePolicy>,
    },

    /// Count distinct movie titles per year and genre
    Genres {
        #[command(flatten)]
        job: JobArgs,

        /// Genre to include (repeatable; defaults to the config's list)
        #[arg(long = "genre")]
        genres: Vec<String>,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Options shared by every job command.
#[derive(Args, Debug, Clone, Default)]
pub struct JobArgs {
    /// Input files; `-` or none reads stdin
    pub inputs: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to the config's, then tsv)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file (defaults to searching for .basketmap.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print job counters and stage timings to stderr
    #[arg(long)]
    pub stats: bool,

    #[command(flatten)]
    pub execution: ExecutionArgs,
}

/// Overrides for how stages run.
#[derive(Args, Debug, Clone, Default)]
pub struct ExecutionArgs {
    /// Number of worker threads (0 = one per core)
    #[arg(short = 'j', long = "jobs")]
    pub jobs: Option<usize>,

    /// Run every phase on the calling thread
    #[arg(long = "sequential", visible_alias = "no-parallel")]
    pub sequential: bool,

    /// Records or key groups per parallel task
    #[arg(long = "batch-size")]
    pub batch_size: Option<usize>,

    /// Skip map-side combiners
    #[arg(long = "no-combiner")]
    pub no_combiner: bool,

    /// Spill the shuffle to disk after this many buffered pairs
    #[arg(long = "spill-threshold")]
    pub spill_threshold: Option<usize>,

    /// Directory for shuffle spill files
    #[arg(long = "spill-dir")]
    pub spill_dir: Option<PathBuf>,

    /// What to do with malformed input lines
    #[arg(long = "on-malformed", value_enum)]
    pub on_malformed: Option<MalformedPolicy>,
}
