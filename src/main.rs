use anyhow::Result;
use basketmap::cli::{init_logging, parse_args, Commands};
use basketmap::commands;

fn main() -> Result<()> {
    let cli = parse_args();
    init_logging(cli.verbosity);

    match cli.command {
        Commands::Cooccur { job, tie_policy } => {
            commands::run_cooccur(&job, tie_policy)?;
        }
        Commands::Genres { job, genres } => {
            commands::run_genres(&job, &genres)?;
        }
        Commands::Init { force } => commands::init_config(force)?,
    }

    Ok(())
}
