use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stage_flow::{Pacing, Pipeline, PipelineBuilder, PipelineRunner, ProgressSink};
use tracing::warn;

use crate::decision;
use crate::models::{ClaimRecord, EvaluationMode, EvaluationOutcome, StageDetail};
use crate::remote::{ScoringClient, decision_from_response, stage_results_from_response};
use crate::stages::*;

/// Pipelines evaluating claims carry [`StageDetail`] findings
pub type ClaimPipeline = Pipeline<ClaimRecord, StageDetail>;

/// Pause taken after the last stage before the decision is published, when
/// pacing is on
const AGGREGATION_DELAY: Duration = Duration::from_millis(2000);

pub fn build_claim_pipeline(pacing: Pacing) -> ClaimPipeline {
    PipelineBuilder::new("claim_evaluation")
        .pacing(pacing)
        .add_stage(Arc::new(IntakeStage))
        .add_stage(Arc::new(DocumentVerifierStage))
        .add_stage(Arc::new(FraudDetectionStage))
        .add_stage(Arc::new(PolicyMatcherStage::new()))
        .add_stage(Arc::new(DamageEstimatorStage::new()))
        .build()
}

/// Strategy for turning a claim into stage results plus a decision
///
/// Implementations must always deliver an outcome; infrastructure faults
/// are handled inside the evaluator, not surfaced to the caller.
#[async_trait]
pub trait ClaimEvaluator: Send + Sync {
    /// The path this evaluator is configured to take
    fn mode(&self) -> EvaluationMode;

    async fn evaluate(
        &self,
        claim: &ClaimRecord,
        progress: &dyn ProgressSink<StageDetail>,
    ) -> EvaluationOutcome;
}

/// Runs the rule-based stages in this process
pub struct LocalPipelineEvaluator {
    runner: PipelineRunner<ClaimRecord, StageDetail>,
    pacing: Pacing,
}

impl LocalPipelineEvaluator {
    pub fn new(pipeline: Arc<ClaimPipeline>) -> Self {
        let pacing = pipeline.pacing();
        Self {
            runner: PipelineRunner::new(pipeline),
            pacing,
        }
    }
}

#[async_trait]
impl ClaimEvaluator for LocalPipelineEvaluator {
    fn mode(&self) -> EvaluationMode {
        EvaluationMode::Local
    }

    async fn evaluate(
        &self,
        claim: &ClaimRecord,
        progress: &dyn ProgressSink<StageDetail>,
    ) -> EvaluationOutcome {
        let stages = self.runner.run(claim, progress).await;

        if self.pacing == Pacing::Simulated {
            tokio::time::sleep(AGGREGATION_DELAY).await;
        }
        let decision = decision::summarize(&stages);

        EvaluationOutcome {
            mode: EvaluationMode::Local,
            stages,
            decision,
        }
    }
}

/// Delegates scoring to the remote service, falling back to the local
/// pipeline when the service is unreachable or answers nonsense
pub struct RemoteEvaluator {
    client: ScoringClient,
    pipeline: Arc<ClaimPipeline>,
    fallback: LocalPipelineEvaluator,
}

impl RemoteEvaluator {
    pub fn new(client: ScoringClient, pipeline: Arc<ClaimPipeline>) -> Self {
        let fallback = LocalPipelineEvaluator::new(pipeline.clone());
        Self {
            client,
            pipeline,
            fallback,
        }
    }
}

#[async_trait]
impl ClaimEvaluator for RemoteEvaluator {
    fn mode(&self) -> EvaluationMode {
        EvaluationMode::Remote
    }

    async fn evaluate(
        &self,
        claim: &ClaimRecord,
        progress: &dyn ProgressSink<StageDetail>,
    ) -> EvaluationOutcome {
        // All stages show as in flight while the remote call runs
        let mut snapshot = self.pipeline.initial_results();
        for stage in &mut snapshot {
            stage.begin();
        }
        progress.update(&snapshot).await;

        match self.client.score(claim).await {
            Ok(response) => {
                let stages = stage_results_from_response(&response);
                let decision = decision_from_response(&response);
                progress.update(&stages).await;

                EvaluationOutcome {
                    mode: EvaluationMode::Remote,
                    stages,
                    decision,
                }
            }
            Err(error) => {
                warn!(error = %error, "remote scoring failed, falling back to the local pipeline");
                self.fallback.evaluate(claim, progress).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StageName;
    use stage_flow::{DiscardProgress, StageStatus};

    #[tokio::test]
    async fn pipeline_runs_the_five_stages_in_order() {
        let pipeline = build_claim_pipeline(Pacing::Disabled);
        assert_eq!(pipeline.len(), 5);
        assert_eq!(
            pipeline.stage_names(),
            StageName::ALL.map(|name| name.as_str().to_string()).to_vec()
        );
    }

    #[tokio::test]
    async fn local_evaluator_always_produces_a_decision() {
        let pipeline = Arc::new(build_claim_pipeline(Pacing::Disabled));
        let evaluator = LocalPipelineEvaluator::new(pipeline);
        assert_eq!(evaluator.mode(), EvaluationMode::Local);

        let outcome = evaluator
            .evaluate(&ClaimRecord::default(), &DiscardProgress)
            .await;

        assert_eq!(outcome.mode, EvaluationMode::Local);
        assert_eq!(outcome.stages.len(), 5);
        assert!(outcome.stages.iter().all(|s| s.status == StageStatus::Completed));
        // an empty claim has no valid policy date, so it cannot approve
        assert!(!outcome.decision.approved);
    }

    #[tokio::test]
    async fn remote_evaluator_falls_back_when_the_service_is_unreachable() {
        let client = ScoringClient::new(
            // nothing listens on the discard port
            "http://127.0.0.1:9",
            Duration::from_millis(500),
        )
        .unwrap();
        let pipeline = Arc::new(build_claim_pipeline(Pacing::Disabled));
        let evaluator = RemoteEvaluator::new(client, pipeline);
        assert_eq!(evaluator.mode(), EvaluationMode::Remote);

        let outcome = evaluator
            .evaluate(&ClaimRecord::default(), &DiscardProgress)
            .await;

        // the fallback ran the local stages, detail payloads included
        assert_eq!(outcome.mode, EvaluationMode::Local);
        assert!(outcome.stages.iter().all(|s| s.detail.is_some()));
    }
}
