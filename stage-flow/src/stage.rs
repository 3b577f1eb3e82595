use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Message recorded on a stage result when its evaluation returned an error
pub const STAGE_FAILED_MESSAGE: &str = "Processing failed";

/// Lifecycle of a single stage within a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Not started yet
    Pending,
    /// Currently evaluating
    Processing,
    /// Finished with a score and message
    Completed,
    /// Evaluation returned an error; the rest of the run continues
    Failed,
}

impl StageStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageStatus::Completed | StageStatus::Failed)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StageStatus::Pending => "pending",
            StageStatus::Processing => "processing",
            StageStatus::Completed => "completed",
            StageStatus::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

/// What a stage produces when it completes successfully
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput<D> {
    /// Confidence score on a 0-100 scale
    pub score: Option<u8>,
    /// Human-readable summary of the outcome
    pub message: String,
    /// Structured findings, if the stage has any
    pub detail: Option<D>,
}

impl<D> StageOutput<D> {
    pub fn new(score: u8, message: impl Into<String>, detail: D) -> Self {
        Self {
            score: Some(score),
            message: message.into(),
            detail: Some(detail),
        }
    }

    /// Output carrying a score and message but no structured detail
    pub fn scored(score: u8, message: impl Into<String>) -> Self {
        Self {
            score: Some(score),
            message: message.into(),
            detail: None,
        }
    }

    /// Output for stages that only report a message
    pub fn unscored(message: impl Into<String>) -> Self {
        Self {
            score: None,
            message: message.into(),
            detail: None,
        }
    }
}

/// Snapshot of one stage within a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult<D> {
    /// Display name of the stage that produced this result
    pub stage: String,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<D>,
}

impl<D> StageResult<D> {
    /// A stage that has not started yet
    pub fn pending(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Pending,
            score: None,
            message: None,
            detail: None,
        }
    }

    /// Mark this stage as currently evaluating
    pub fn begin(&mut self) {
        self.status = StageStatus::Processing;
    }

    /// A stage that finished with the given output
    pub fn completed(stage: impl Into<String>, output: StageOutput<D>) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Completed,
            score: output.score,
            message: Some(output.message),
            detail: output.detail,
        }
    }

    /// A stage whose evaluation returned an error
    pub fn failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Failed,
            score: None,
            message: Some(message.into()),
            detail: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Core trait that all pipeline stages implement
///
/// `C` is the record being evaluated, `D` the structured detail type the
/// pipeline's stages report their findings in.
#[async_trait]
pub trait Stage<C, D>: Send + Sync {
    /// Display name for this stage, unique within a pipeline
    fn name(&self) -> &str;

    /// Delay applied before evaluation when pacing is enabled
    fn pacing_delay(&self) -> Duration {
        Duration::ZERO
    }

    /// Evaluate the record and produce this stage's output
    async fn evaluate(&self, record: &C) -> Result<StageOutput<D>>;
}
