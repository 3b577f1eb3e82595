//! Client and adapters for the external claim scoring service.
//!
//! The service receives the flattened claim text and answers with a small
//! JSON verdict. The adapters below translate that verdict into the same
//! `Decision` and stage-result shapes the local pipeline produces, so
//! callers never see which path evaluated the claim.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::currency::{format_amount, parse_amount};
use crate::decision::{
    APPROVAL_NEXT_STEPS, DENIAL_NEXT_STEPS, FRAUD_ADVISORY_THRESHOLD, FRAUD_DENIAL_REASON,
    FRAUD_DENIAL_THRESHOLD, WEAK_DOCUMENTATION_CONDITION,
};
use crate::models::{ClaimRecord, ClaimStageResult, Decision, STANDARD_DEDUCTIBLE, StageName};
use crate::stages::fraud::risk_message;
use crate::stages::policy::{POLICY_ACTIVE_MESSAGE, POLICY_NOT_ACTIVE_MESSAGE};
use crate::wire::to_scoring_payload;
use stage_flow::{StageOutput, StageResult};

const APPROVED_DECISION: &str = "Approved";

const REMOTE_APPROVED_REASON: &str = "Claim approved based on comprehensive AI evaluation";
const REMOTE_DENIED_REASON: &str = "Claim denied due to policy or fraud concerns";
const REMOTE_VERIFICATION_CONDITION: &str = "Subject to additional verification";

const INTAKE_PARSED_MESSAGE: &str = "Successfully parsed and structured claim data";
const DOCUMENTS_VERIFIED_MESSAGE: &str = "Documents verified successfully";
const DOCUMENTS_UNVERIFIED_MESSAGE: &str = "Insufficient documentation provided";

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("scoring request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("scoring service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("scoring response did not match the expected schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Verdict returned by the scoring service
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringResponse {
    pub decision: String,
    pub details: ScoringDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringDetails {
    /// Fraud probability on a 0.0-1.0 scale
    pub fraud_score: f64,
    pub policy_matched: bool,
    pub documents_verified: bool,
    #[serde(default)]
    pub estimated_damage: Option<String>,
    #[serde(default)]
    pub damage_summary: Option<String>,
}

impl ScoringResponse {
    pub fn approved(&self) -> bool {
        self.decision == APPROVED_DECISION
    }

    /// Fraud probability rescaled to the local 0-100 convention
    pub fn fraud_percent(&self) -> u8 {
        (self.details.fraud_score * 100.0).round().clamp(0.0, 100.0) as u8
    }

    fn parsed_damage(&self) -> f64 {
        self.details
            .estimated_damage
            .as_deref()
            .map(parse_amount)
            .unwrap_or(0.0)
    }
}

/// HTTP client for the scoring service
pub struct ScoringClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScoringClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Submit the claim and parse the service's verdict
    pub async fn score(&self, claim: &ClaimRecord) -> Result<ScoringResponse, RemoteError> {
        let payload = to_scoring_payload(claim);
        debug!(bytes = payload.len(), "posting claim to scoring service");

        let response = self
            .http
            .post(format!("{}/process-claim", self.base_url))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Map the remote verdict onto the local decision shape
pub fn decision_from_response(response: &ScoringResponse) -> Decision {
    let approved = response.approved();
    let fraud_score = response.fraud_percent();
    let policy_valid = response.details.policy_matched;
    let parsed_damage = response.parsed_damage();

    let mut reason = if approved {
        REMOTE_APPROVED_REASON.to_string()
    } else {
        REMOTE_DENIED_REASON.to_string()
    };
    if !policy_valid {
        reason = POLICY_NOT_ACTIVE_MESSAGE.to_string();
    } else if fraud_score > FRAUD_DENIAL_THRESHOLD {
        reason = FRAUD_DENIAL_REASON.to_string();
    }

    let mut conditions: Vec<String> = Vec::new();
    if approved {
        if fraud_score > FRAUD_ADVISORY_THRESHOLD {
            conditions.push(REMOTE_VERIFICATION_CONDITION.to_string());
        }
        if !response.details.documents_verified {
            conditions.push(WEAK_DOCUMENTATION_CONDITION.to_string());
        }
    }

    // A denied claim keeps the parsed figure as the exposure on record
    let estimated_payout = if approved {
        (parsed_damage - STANDARD_DEDUCTIBLE).max(0.0)
    } else {
        parsed_damage
    };

    let next_steps = if approved {
        APPROVAL_NEXT_STEPS.iter().map(|s| s.to_string()).collect()
    } else {
        DENIAL_NEXT_STEPS.iter().map(|s| s.to_string()).collect()
    };

    Decision {
        approved,
        reason,
        fraud_score,
        policy_valid,
        estimated_payout,
        conditions: if conditions.is_empty() {
            None
        } else {
            Some(conditions)
        },
        next_steps,
    }
}

fn synthesized(name: StageName, score: u8, message: impl Into<String>) -> ClaimStageResult {
    StageResult::completed(name.as_str(), StageOutput::scored(score, message))
}

/// Reconstruct per-stage results from the remote verdict
///
/// The scoring service reports a single verdict, so the stage list is
/// synthesized from its fields with no structured detail attached.
pub fn stage_results_from_response(response: &ScoringResponse) -> Vec<ClaimStageResult> {
    let fraud_score = response.fraud_percent();

    let (documents_score, documents_message) = if response.details.documents_verified {
        (85, DOCUMENTS_VERIFIED_MESSAGE)
    } else {
        (30, DOCUMENTS_UNVERIFIED_MESSAGE)
    };

    let (policy_score, policy_message) = if response.details.policy_matched {
        (100, POLICY_ACTIVE_MESSAGE)
    } else {
        (0, POLICY_NOT_ACTIVE_MESSAGE)
    };

    let damage_message = response.details.damage_summary.clone().unwrap_or_else(|| {
        format!(
            "Estimated damage: {}",
            format_amount(response.parsed_damage())
        )
    });

    vec![
        synthesized(StageName::Intake, 100, INTAKE_PARSED_MESSAGE),
        synthesized(StageName::DocumentVerifier, documents_score, documents_message),
        synthesized(StageName::FraudDetection, fraud_score, risk_message(fraud_score)),
        synthesized(StageName::PolicyMatcher, policy_score, policy_message),
        synthesized(StageName::DamageEstimator, 90, damage_message),
    ]
}
