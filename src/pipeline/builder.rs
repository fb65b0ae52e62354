//! Pipeline builder for chaining stages.
//!
//! This module provides a type-safe fluent API: the builder tracks the
//! pipeline's input type `I` and current output type `T`, and each added
//! stage must accept `T`.

use super::stage::{AnyStage, Stage};
use crate::errors::{Error, Result};
use std::any::Any;
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Builder for constructing pipelines.
///
/// # Example
///
/// ```rust
/// use basketmap::basket::{PairCounter, SessionGrouper};
/// use basketmap::core::ItemPair;
/// use basketmap::io::read_lines;
/// use basketmap::mapreduce::{ExecutionContext, ExecutionOptions};
/// use basketmap::pipeline::{MapReduceStage, PipelineBuilder};
/// use std::sync::Arc;
///
/// let context = Arc::new(ExecutionContext::new(ExecutionOptions::sequential()).unwrap());
/// let pipeline = PipelineBuilder::new()
///     .stage(MapReduceStage::new(SessionGrouper, Arc::clone(&context)))
///     .stage(MapReduceStage::new(PairCounter, context))
///     .build();
///
/// let lines = read_lines(&b"1,d,eggs\n1,d,milk\n"[..], "orders").unwrap();
/// let pairs = pipeline.execute(lines).unwrap();
/// assert_eq!(pairs[0], (ItemPair::new("eggs", "milk"), 1));
/// ```
pub struct PipelineBuilder<I, T = I> {
    stages: Vec<Box<dyn AnyStage>>,
    progress_enabled: bool,
    _phantom: PhantomData<fn(I) -> T>,
}

impl<I> PipelineBuilder<I, I> {
    /// Create a new empty pipeline builder.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            progress_enabled: false,
            _phantom: PhantomData,
        }
    }
}

impl<I> Default for PipelineBuilder<I, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T> PipelineBuilder<I, T> {
    /// Add a stage to the pipeline.
    ///
    /// The stage's input type must match the current pipeline output type.
    pub fn stage<S>(mut self, stage: S) -> PipelineBuilder<I, S::Output>
    where
        S: Stage<Input = T> + Send + Sync + 'static,
        S::Input: 'static,
        S::Output: 'static,
        S::Error: Into<Error>,
    {
        self.stages.push(Box::new(stage));
        PipelineBuilder {
            stages: self.stages,
            progress_enabled: self.progress_enabled,
            _phantom: PhantomData,
        }
    }

    /// Log each stage at `info` as it starts.
    pub fn with_progress(mut self) -> Self {
        self.progress_enabled = true;
        self
    }

    /// Build the final pipeline ready for execution.
    pub fn build(self) -> BuiltPipeline<I, T> {
        BuiltPipeline {
            stages: self.stages,
            progress_enabled: self.progress_enabled,
            _phantom: PhantomData,
        }
    }
}

/// A built pipeline ready for execution.
///
/// The pipeline can be executed multiple times with different inputs.
pub struct BuiltPipeline<I, T> {
    stages: Vec<Box<dyn AnyStage>>,
    progress_enabled: bool,
    _phantom: PhantomData<fn(I) -> T>,
}

impl<I: 'static, T: 'static> BuiltPipeline<I, T> {
    /// Thread `input` through every stage in order.
    pub fn execute(&self, input: I) -> Result<T> {
        self.run(input, |_, _| {})
    }

    /// Execute the pipeline and collect timing information for each stage.
    pub fn execute_with_timing(&self, input: I) -> Result<(T, Vec<StageTiming>)> {
        let mut timings = Vec::with_capacity(self.stages.len());
        let output = self.run(input, |name, duration| {
            timings.push(StageTiming {
                name: name.to_string(),
                duration,
            })
        })?;
        Ok((output, timings))
    }

    /// Names of the stages in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    fn run(&self, input: I, mut on_stage_done: impl FnMut(&str, Duration)) -> Result<T> {
        let mut data: Box<dyn Any> = Box::new(input);
        let total = self.stages.len();

        for (i, stage) in self.stages.iter().enumerate() {
            if self.progress_enabled {
                info!("Stage {}/{}: {}", i + 1, total, stage.name());
            }

            let start = Instant::now();
            data = stage
                .execute_any(data)
                .map_err(|e| e.in_stage(stage.name()))?;
            let elapsed = start.elapsed();

            debug!(
                stage = stage.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                "stage finished"
            );
            on_stage_done(stage.name(), elapsed);
        }

        data.downcast::<T>()
            .map(|b| *b)
            .map_err(|_| Error::Pipeline("type mismatch in pipeline output".to_string()))
    }
}

/// Timing information for a pipeline stage.
#[derive(Debug, Clone)]
pub struct StageTiming {
    /// Name of the stage
    pub name: String,

    /// Time taken to execute the stage
    pub duration: Duration,
}

impl StageTiming {
    /// Format the timing as a human-readable string.
    pub fn format(&self) -> String {
        format!("{}: {:.2}s", self.name, self.duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scale {
        name: &'static str,
        factor: i64,
    }

    impl Stage for Scale {
        type Input = i64;
        type Output = i64;
        type Error = Error;

        fn execute(&self, input: i64) -> Result<i64> {
            Ok(input * self.factor)
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    struct Render;

    impl Stage for Render {
        type Input = i64;
        type Output = String;
        type Error = Error;

        fn execute(&self, input: i64) -> Result<String> {
            Ok(input.to_string())
        }

        fn name(&self) -> &str {
            "Render"
        }
    }

    struct Reject;

    impl Stage for Reject {
        type Input = i64;
        type Output = i64;
        type Error = Error;

        fn execute(&self, _input: i64) -> Result<i64> {
            Err(Error::config("no thanks"))
        }

        fn name(&self) -> &str {
            "Reject"
        }
    }

    fn scale(name: &'static str, factor: i64) -> Scale {
        Scale { name, factor }
    }

    #[test]
    fn test_pipeline_builder() {
        let pipeline = PipelineBuilder::<i64>::new()
            .stage(scale("Triple", 3))
            .stage(scale("Double", 2))
            .stage(Render)
            .build();

        assert_eq!(pipeline.execute(0).unwrap(), "0");
        assert_eq!(pipeline.execute(4).unwrap(), "24");
    }

    #[test]
    fn test_pipeline_timing() {
        let pipeline = PipelineBuilder::<i64>::new()
            .stage(scale("Stage 1", 6))
            .stage(scale("Stage 2", 7))
            .with_progress()
            .build();

        let (result, timings) = pipeline.execute_with_timing(1).unwrap();

        assert_eq!(result, 42);
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[0].name, "Stage 1");
        assert_eq!(timings[1].name, "Stage 2");
        assert!(timings[0].format().starts_with("Stage 1: "));
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let pipeline = PipelineBuilder::<String>::new().build();
        assert!(pipeline.stage_names().is_empty());
        assert_eq!(pipeline.execute("same".to_string()).unwrap(), "same");
    }

    #[test]
    fn test_stage_failure_names_the_stage() {
        let pipeline = PipelineBuilder::<i64>::new()
            .stage(scale("Double", 2))
            .stage(Reject)
            .build();

        assert_eq!(pipeline.stage_names(), vec!["Double", "Reject"]);
        let err = pipeline.execute(1).unwrap_err();
        assert!(matches!(err, Error::Stage { ref stage, .. } if stage == "Reject"));
        assert!(err.to_string().contains("no thanks"));
    }
}
