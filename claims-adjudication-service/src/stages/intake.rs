use std::time::Duration;

use async_trait::async_trait;
use stage_flow::{Result, Stage, StageOutput};
use tracing::info;

use crate::models::{ClaimRecord, IntakeDetail, StageDetail, StageName};

/// Penalty applied to the completeness score per missing required field
const MISSING_FIELD_PENALTY: u8 = 10;

/// Stage that checks the claim form for the required fields
pub struct IntakeStage;

fn missing_required_fields(claim: &ClaimRecord) -> Vec<String> {
    let mut missing = Vec::new();
    if claim.policy_number.is_empty() {
        missing.push("Policy Number".to_string());
    }
    if claim.claimant_name.is_empty() {
        missing.push("Claimant Name".to_string());
    }
    if claim.incident_date.is_none() {
        missing.push("Incident Date".to_string());
    }
    missing
}

#[async_trait]
impl Stage<ClaimRecord, StageDetail> for IntakeStage {
    fn name(&self) -> &str {
        StageName::Intake.as_str()
    }

    fn pacing_delay(&self) -> Duration {
        Duration::from_millis(1500)
    }

    async fn evaluate(&self, claim: &ClaimRecord) -> Result<StageOutput<StageDetail>> {
        info!("running stage: {}", self.name());

        let missing = missing_required_fields(claim);
        let completeness =
            100u8.saturating_sub(MISSING_FIELD_PENALTY * missing.len() as u8);

        let message = if missing.is_empty() {
            "All required information captured successfully".to_string()
        } else {
            format!("Missing required fields: {}", missing.join(", "))
        };

        Ok(StageOutput::new(
            completeness,
            message,
            StageDetail::Intake(IntakeDetail {
                structured: true,
                missing_fields: missing,
                completeness,
            }),
        ))
    }
}
