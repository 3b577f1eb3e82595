use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Weekday};
use stage_flow::{Result, Stage, StageOutput};
use tracing::info;

use crate::models::{ClaimRecord, FraudDetail, RiskLevel, StageDetail, StageName};

/// Damage amount at which a claim is considered suspiciously large
const HIGH_DAMAGE_THRESHOLD: f64 = 500_000.0;
/// Prior-claim count at which claim frequency becomes a signal
const PREVIOUS_CLAIMS_THRESHOLD: u32 = 3;

/// Stage that scores the claim against a set of additive fraud signals
pub struct FraudDetectionStage;

pub(crate) fn risk_message(score: u8) -> String {
    format!(
        "Fraud risk: {} ({}% risk score)",
        RiskLevel::from_score(score),
        score
    )
}

fn weekend_incident(claim: &ClaimRecord) -> bool {
    claim
        .incident_date
        .map(|date| matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
        .unwrap_or(false)
}

#[async_trait]
impl Stage<ClaimRecord, StageDetail> for FraudDetectionStage {
    fn name(&self) -> &str {
        StageName::FraudDetection.as_str()
    }

    fn pacing_delay(&self) -> Duration {
        Duration::from_millis(2500)
    }

    async fn evaluate(&self, claim: &ClaimRecord) -> Result<StageOutput<StageDetail>> {
        info!("running stage: {}", self.name());

        let mut risk_score: u32 = 0;
        let mut risk_factors = Vec::new();

        if claim.estimated_damage >= HIGH_DAMAGE_THRESHOLD {
            risk_score += 40;
            risk_factors.push("High damage amount (≥₹500,000)".to_string());
        }
        if claim.previous_claims >= PREVIOUS_CLAIMS_THRESHOLD {
            risk_score += 40;
            risk_factors.push("Multiple previous claims (≥3)".to_string());
        }
        if !claim.has_documents || claim.document_types.is_empty() {
            risk_score += 30;
            risk_factors.push("Insufficient documentation".to_string());
        }
        if weekend_incident(claim) {
            risk_score += 10;
            risk_factors.push("Weekend incident".to_string());
        }
        if claim.estimated_damage % 1000.0 == 0.0 {
            risk_score += 5;
            risk_factors.push("Round damage estimate".to_string());
        }

        let score = risk_score.min(100) as u8;
        let risk_level = RiskLevel::from_score(score);
        if risk_level == RiskLevel::High {
            info!(score, "claim flagged as high fraud risk");
        }

        Ok(StageOutput::new(
            score,
            risk_message(score),
            StageDetail::Fraud(FraudDetail {
                risk_score: score,
                risk_factors,
                risk_level,
            }),
        ))
    }
}
