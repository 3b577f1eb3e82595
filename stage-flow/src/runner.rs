//! PipelineRunner – drives a full pipeline run while publishing every stage
//! transition to a [`ProgressSink`].
//!
//! A run moves each stage through `pending → processing → completed/failed`.
//! The runner reports the whole result list to the sink after every
//! transition, so a caller that persists the snapshots can serve live
//! progress reads while the run is still going.
//!
//! Use [`Pipeline::run`] directly when you only care about the final results
//! and don't need intermediate snapshots.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::{pipeline::Pipeline, stage::StageResult};

/// Receives the full stage list after every transition of a run
#[async_trait]
pub trait ProgressSink<D>: Send + Sync {
    async fn update(&self, stages: &[StageResult<D>]);
}

/// Sink that discards all progress updates
pub struct DiscardProgress;

#[async_trait]
impl<D> ProgressSink<D> for DiscardProgress
where
    D: Send + Sync,
{
    async fn update(&self, _stages: &[StageResult<D>]) {}
}

/// High-level helper that runs a pipeline and reports progress as it goes
#[derive(Clone)]
pub struct PipelineRunner<C, D> {
    pipeline: Arc<Pipeline<C, D>>,
}

impl<C, D> PipelineRunner<C, D>
where
    C: Send + Sync,
    D: Send + Sync,
{
    pub fn new(pipeline: Arc<Pipeline<C, D>>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Arc<Pipeline<C, D>> {
        &self.pipeline
    }

    /// Run every stage in order, reporting each transition to `sink`
    ///
    /// The first update carries all stages as pending; each stage then gets a
    /// processing update before its evaluation and a terminal update after it.
    pub async fn run(&self, record: &C, sink: &dyn ProgressSink<D>) -> Vec<StageResult<D>> {
        let mut results = self.pipeline.initial_results();
        sink.update(&results).await;

        for (index, stage) in self.pipeline.stages().iter().enumerate() {
            debug!(
                pipeline = %self.pipeline.name(),
                stage = %stage.name(),
                "stage starting"
            );
            results[index].begin();
            sink.update(&results).await;

            results[index] = self.pipeline.drive_stage(stage.as_ref(), record).await;
            debug!(
                pipeline = %self.pipeline.name(),
                stage = %stage.name(),
                status = %results[index].status,
                "stage finished"
            );
            sink.update(&results).await;
        }

        results
    }
}
