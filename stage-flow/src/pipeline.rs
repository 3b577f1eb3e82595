use std::sync::Arc;

use tracing::warn;

use crate::{
    error::{FlowError, Result},
    stage::{STAGE_FAILED_MESSAGE, Stage, StageResult},
};

/// Whether stage pacing delays are applied during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Run stages back to back
    #[default]
    Disabled,
    /// Honor each stage's `pacing_delay` before evaluating it
    Simulated,
}

/// An ordered sequence of stages evaluated against a single record
pub struct Pipeline<C, D> {
    name: String,
    stages: Vec<Arc<dyn Stage<C, D>>>,
    pacing: Pacing,
}

impl<C, D> Pipeline<C, D>
where
    C: Send + Sync,
    D: Send,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            pacing: Pacing::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Display names of all stages in execution order
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name().to_string()).collect()
    }

    /// Pending results for every stage, in execution order
    pub fn initial_results(&self) -> Vec<StageResult<D>> {
        self.stages
            .iter()
            .map(|s| StageResult::pending(s.name()))
            .collect()
    }

    pub(crate) fn stages(&self) -> &[Arc<dyn Stage<C, D>>] {
        &self.stages
    }

    /// Evaluate the stage at `index` against the record
    ///
    /// A stage error is absorbed into a `Failed` result so that one faulty
    /// stage cannot abort the rest of the run. `Err` is only returned for an
    /// out-of-range index.
    pub async fn execute_stage(&self, index: usize, record: &C) -> Result<StageResult<D>> {
        let stage = self
            .stages
            .get(index)
            .ok_or_else(|| FlowError::StageNotFound(format!("stage index {index}")))?;
        Ok(self.drive_stage(stage.as_ref(), record).await)
    }

    /// Evaluate every stage in order and collect the results
    pub async fn run(&self, record: &C) -> Vec<StageResult<D>> {
        let mut results = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            results.push(self.drive_stage(stage.as_ref(), record).await);
        }
        results
    }

    pub(crate) async fn drive_stage(
        &self,
        stage: &dyn Stage<C, D>,
        record: &C,
    ) -> StageResult<D> {
        if self.pacing == Pacing::Simulated {
            let delay = stage.pacing_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        match stage.evaluate(record).await {
            Ok(output) => StageResult::completed(stage.name(), output),
            Err(err) => {
                warn!(
                    pipeline = %self.name,
                    stage = %stage.name(),
                    error = %err,
                    "stage evaluation failed"
                );
                StageResult::failed(stage.name(), STAGE_FAILED_MESSAGE)
            }
        }
    }
}

/// Builder for assembling pipelines
pub struct PipelineBuilder<C, D> {
    pipeline: Pipeline<C, D>,
}

impl<C, D> PipelineBuilder<C, D>
where
    C: Send + Sync,
    D: Send,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            pipeline: Pipeline::new(name),
        }
    }

    /// Append a stage; stages run in the order they were added
    pub fn add_stage(mut self, stage: Arc<dyn Stage<C, D>>) -> Self {
        self.pipeline.stages.push(stage);
        self
    }

    pub fn pacing(mut self, pacing: Pacing) -> Self {
        self.pipeline.pacing = pacing;
        self
    }

    pub fn build(self) -> Pipeline<C, D> {
        self.pipeline
    }
}
