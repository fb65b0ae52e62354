use super::{run_job, JobSummary};
use crate::cli::JobArgs;
use crate::config::TiePolicy;
use crate::pipeline::cooccurrence_pipeline;
use anyhow::Result;

/// Run the co-occurrence pipeline; `tie_policy` overrides the config's.
pub fn run_cooccur(job: &JobArgs, tie_policy: Option<TiePolicy>) -> Result<JobSummary> {
    run_job(job, |context, config| {
        let policy = tie_policy.unwrap_or(config.pipeline().tie_policy);
        tracing::debug!("Tie policy: {:?}", policy);
        cooccurrence_pipeline(context, policy)
    })
}
