//! Pipeline stage abstractions.
//!
//! A [`Stage`] turns one typed value into another. Map/reduce jobs become
//! stages through [`MapReduceStage`], which runs the job on a shared
//! [`ExecutionContext`] so every stage of a run shares its worker pool and
//! counters.

use crate::errors::Error;
use crate::mapreduce::{ExecutionContext, MapReduce};
use std::any::Any;
use std::sync::Arc;

/// A pipeline stage that transforms data.
///
/// The builder only accepts a stage whose `Input` equals the output of the
/// stage before it:
/// ```rust,ignore
/// PipelineBuilder::<Vec<InputLine>>::new()
///     .stage(sessions)  // Vec<InputLine> -> Vec<(SessionKey, ItemSet)>
///     .stage(pairs)     // Vec<(SessionKey, ItemSet)> -> Vec<(ItemPair, u64)>
///     .stage(sessions)  // compile error
/// ```
pub trait Stage {
    type Input;
    type Output;
    type Error;

    /// Execute this stage with the given input.
    fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;

    /// Get the stage name for logs and timings.
    fn name(&self) -> &str;
}

/// A [`MapReduce`] job run as a pipeline stage.
pub struct MapReduceStage<J> {
    job: J,
    context: Arc<ExecutionContext>,
}

impl<J: MapReduce> MapReduceStage<J> {
    pub fn new(job: J, context: Arc<ExecutionContext>) -> Self {
        Self { job, context }
    }

    pub fn job(&self) -> &J {
        &self.job
    }
}

impl<J: MapReduce> Stage for MapReduceStage<J> {
    type Input = Vec<J::Input>;
    type Output = Vec<J::Output>;
    type Error = Error;

    fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        self.context.run(&self.job, input)
    }

    fn name(&self) -> &str {
        self.job.name()
    }
}

/// Type-erased stage stored by the pipeline builder.
pub(crate) trait AnyStage: Send + Sync {
    fn execute_any(&self, input: Box<dyn Any>) -> Result<Box<dyn Any>, Error>;
    fn name(&self) -> &str;
}

impl<S> AnyStage for S
where
    S: Stage + Send + Sync,
    S::Input: 'static,
    S::Output: 'static,
    S::Error: Into<Error>,
{
    fn execute_any(&self, input: Box<dyn Any>) -> Result<Box<dyn Any>, Error> {
        let typed_input = input.downcast::<S::Input>().map_err(|_| {
            Error::Pipeline(format!(
                "type mismatch in input of stage '{}'",
                Stage::name(self)
            ))
        })?;

        let output = self.execute(*typed_input).map_err(Into::into)?;
        Ok(Box::new(output))
    }

    fn name(&self) -> &str {
        Stage::name(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basket::PairCounter;
    use crate::core::{ItemPair, ItemSet, SessionKey};
    use crate::mapreduce::ExecutionOptions;

    #[test]
    fn test_map_reduce_stage_uses_job_name() {
        let context = Arc::new(ExecutionContext::new(ExecutionOptions::sequential()).unwrap());
        let stage = MapReduceStage::new(PairCounter, context);
        assert_eq!(Stage::name(&stage), "pair-counter");
    }

    #[test]
    fn test_map_reduce_stage_execution() {
        let context = Arc::new(ExecutionContext::new(ExecutionOptions::sequential()).unwrap());
        let stage = MapReduceStage::new(PairCounter, context.clone());
        let items = ItemSet::from_items(["a".to_string(), "b".to_string()]);

        let output = stage
            .execute(vec![
                (SessionKey::new("1", "d1"), items.clone()),
                (SessionKey::new("2", "d1"), items),
            ])
            .unwrap();

        assert_eq!(
            output,
            vec![(ItemPair::new("a", "b"), 2), (ItemPair::new("b", "a"), 2)]
        );
        assert_eq!(context.counters().get("pair-counter", "map_input_records"), 2);
    }

    #[test]
    fn test_any_stage_rejects_wrong_input_type() {
        let context = Arc::new(ExecutionContext::new(ExecutionOptions::sequential()).unwrap());
        let stage = MapReduceStage::new(PairCounter, context);
        let err = stage.execute_any(Box::new("not a session list")).unwrap_err();
        assert_eq!(err.category(), "Pipeline");
        assert!(err.to_string().contains("pair-counter"));
    }
}
