use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use stage_flow::{Result, Stage, StageOutput};
use tracing::info;

use crate::currency::group_digits;
use crate::models::{
    ClaimRecord, CostBreakdown, DamageDetail, Repairability, StageDetail, StageName,
};

/// Model year assumed when the claim form leaves the vehicle year blank or
/// unparsable
const DEFAULT_MODEL_YEAR: i32 = 2020;
/// Multiplier applied to the estimate once a vehicle is older than ten years
const AGE_DEPRECIATION: f64 = 0.9;
/// Repair estimates carry a fixed confidence score
const ESTIMATE_SCORE: u8 = 90;

const LABOR_SHARE: f64 = 0.4;
const PARTS_SHARE: f64 = 0.6;

/// Stage that turns the claimed damage amount into a repair estimate
pub struct DamageEstimatorStage {
    valuation_year: i32,
}

impl DamageEstimatorStage {
    pub fn new() -> Self {
        Self::with_valuation_year(Utc::now().year())
    }

    /// Pin the year vehicle ages are computed against
    pub fn with_valuation_year(valuation_year: i32) -> Self {
        Self { valuation_year }
    }
}

impl Default for DamageEstimatorStage {
    fn default() -> Self {
        Self::new()
    }
}

fn model_year(raw: &str) -> i32 {
    raw.trim().parse::<i32>().unwrap_or(DEFAULT_MODEL_YEAR)
}

#[async_trait]
impl Stage<ClaimRecord, StageDetail> for DamageEstimatorStage {
    fn name(&self) -> &str {
        StageName::DamageEstimator.as_str()
    }

    fn pacing_delay(&self) -> Duration {
        Duration::from_millis(3000)
    }

    async fn evaluate(&self, claim: &ClaimRecord) -> Result<StageOutput<StageDetail>> {
        info!("running stage: {}", self.name());

        let vehicle_age = self.valuation_year - model_year(&claim.vehicle_year);

        let mut adjusted = claim.estimated_damage;
        if vehicle_age > 10 {
            adjusted *= AGE_DEPRECIATION;
        }

        let adjusted_estimate = adjusted.round() as i64;
        let breakdown = CostBreakdown {
            labor: (adjusted * LABOR_SHARE).round() as i64,
            parts: (adjusted * PARTS_SHARE).round() as i64,
        };

        let repairability = if vehicle_age > 15 {
            Repairability::Challenging
        } else {
            Repairability::Standard
        };

        Ok(StageOutput::new(
            ESTIMATE_SCORE,
            format!("Estimated repair cost: ₹{}", group_digits(adjusted_estimate)),
            StageDetail::Damage(DamageDetail {
                original_estimate: claim.estimated_damage,
                adjusted_estimate,
                breakdown,
                vehicle_age,
                repairability,
            }),
        ))
    }
}
