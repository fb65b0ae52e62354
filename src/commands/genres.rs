use super::{run_job, JobSummary};
use crate::cli::JobArgs;
use crate::pipeline::genre_count_pipeline;
use anyhow::Result;

/// Run the genre count job; an empty `genres` list falls back to the config.
pub fn run_genres(job: &JobArgs, genres: &[String]) -> Result<JobSummary> {
    run_job(job, |context, config| {
        let include = if genres.is_empty() {
            config.genres().include
        } else {
            genres.to_vec()
        };
        tracing::debug!("Counting genres: {:?}", include);
        genre_count_pipeline(context, include)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::OutputFormat;
    use indoc::indoc;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_genres_uses_config_genres() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("movies.txt");
        fs::write(
            &input,
            indoc! {"
                Alien (1979), Sci-Fi
                Stalker (1979), Sci-Fi
                Heat (1995), Crime
                Unforgiven (1992), Western
            "},
        )
        .unwrap();
        let config = dir.path().join("config.toml");
        fs::write(&config, "[genres]\ninclude = [\"Western\"]\n").unwrap();

        let args = JobArgs {
            inputs: vec![input],
            output: Some(dir.path().join("out.tsv")),
            config: Some(config),
            format: Some(OutputFormat::Tsv),
            ..Default::default()
        };

        let summary = run_genres(&args, &[]).unwrap();
        assert_eq!(summary.records_written, 1);
        let written = fs::read_to_string(dir.path().join("out.tsv")).unwrap();
        assert_eq!(written, "1992\tWestern\t1\n");

        let summary = run_genres(&args, &["Sci-Fi".to_string()]).unwrap();
        assert_eq!(summary.records_written, 1);
        let written = fs::read_to_string(dir.path().join("out.tsv")).unwrap();
        assert_eq!(written, "1979\tSci-Fi\t2\n");
    }
}
