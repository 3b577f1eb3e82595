use std::time::Duration;

use async_trait::async_trait;
use stage_flow::{Result, Stage, StageOutput};
use tracing::info;

use crate::models::{
    ClaimRecord, CoverageSummary, PolicyDetail, PolicyWindow, StageDetail, StageName,
};

pub(crate) const POLICY_ACTIVE_MESSAGE: &str = "Policy is active and covers the incident date";
pub(crate) const POLICY_NOT_ACTIVE_MESSAGE: &str = "Policy was not active on the incident date";

/// Stage that checks the incident date against the policy's coverage window
pub struct PolicyMatcherStage {
    window: PolicyWindow,
}

impl PolicyMatcherStage {
    pub fn new() -> Self {
        Self::with_window(PolicyWindow::reference())
    }

    pub fn with_window(window: PolicyWindow) -> Self {
        Self { window }
    }
}

impl Default for PolicyMatcherStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage<ClaimRecord, StageDetail> for PolicyMatcherStage {
    fn name(&self) -> &str {
        StageName::PolicyMatcher.as_str()
    }

    fn pacing_delay(&self) -> Duration {
        Duration::from_millis(1800)
    }

    async fn evaluate(&self, claim: &ClaimRecord) -> Result<StageOutput<StageDetail>> {
        info!("running stage: {}", self.name());

        // An unknown incident date cannot be shown to fall inside the window
        let policy_valid = claim
            .incident_date
            .map(|date| self.window.contains(date))
            .unwrap_or(false);

        let (score, message) = if policy_valid {
            (100, POLICY_ACTIVE_MESSAGE)
        } else {
            (0, POLICY_NOT_ACTIVE_MESSAGE)
        };

        Ok(StageOutput::new(
            score,
            message,
            StageDetail::Policy(PolicyDetail {
                policy_valid,
                coverage: CoverageSummary::standard(),
                policy_period: self.window,
            }),
        ))
    }
}
