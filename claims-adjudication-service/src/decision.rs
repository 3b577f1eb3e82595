//! Folds the five stage results into the final adjudication decision.
//!
//! Denial checks run in a fixed order (policy before fraud), and a missing
//! or failed stage contributes its conservative default: zero scores, an
//! invalid policy, a zero repair estimate. A degraded run therefore lands
//! on the cautious side rather than approving blind.

use stage_flow::StageStatus;
use tracing::info;

use crate::models::{ClaimStageResult, Decision, STANDARD_DEDUCTIBLE, StageDetail, StageName};
use crate::stages::policy::POLICY_NOT_ACTIVE_MESSAGE;

pub const APPROVED_REASON: &str = "Claim approved based on comprehensive evaluation";
pub const FRAUD_DENIAL_REASON: &str = "High fraud risk detected - requires manual investigation";

/// Fraud score at or above which the claim is denied outright
pub const FRAUD_DENIAL_THRESHOLD: u8 = 50;
/// Fraud score above which an approval carries verification conditions
pub const FRAUD_ADVISORY_THRESHOLD: u8 = 30;
/// Document score below which an approval requires more evidence
pub const WEAK_DOCUMENTATION_THRESHOLD: u8 = 50;

pub const ADVISORY_CONDITIONS: [&str; 2] = [
    "Additional documentation required",
    "Subject to further verification",
];
pub const WEAK_DOCUMENTATION_CONDITION: &str = "Must provide additional supporting documents";

pub const APPROVAL_NEXT_STEPS: [&str; 3] = [
    "Schedule vehicle inspection within 5 business days",
    "Contact approved repair facilities",
    "Upload final repair estimates for approval",
];
pub const DENIAL_NEXT_STEPS: [&str; 2] = [
    "Contact claims adjuster for manual review",
    "Provide additional documentation if available",
];

fn find_stage<'a>(
    stages: &'a [ClaimStageResult],
    name: StageName,
) -> Option<&'a ClaimStageResult> {
    stages
        .iter()
        .find(|result| result.stage == name.as_str() && result.status == StageStatus::Completed)
}

fn stage_score(stages: &[ClaimStageResult], name: StageName) -> u8 {
    find_stage(stages, name)
        .and_then(|result| result.score)
        .unwrap_or(0)
}

fn policy_validity(stages: &[ClaimStageResult]) -> bool {
    match find_stage(stages, StageName::PolicyMatcher).and_then(|r| r.detail.as_ref()) {
        Some(StageDetail::Policy(detail)) => detail.policy_valid,
        Some(_) | None => false,
    }
}

fn adjusted_estimate(stages: &[ClaimStageResult]) -> i64 {
    match find_stage(stages, StageName::DamageEstimator).and_then(|r| r.detail.as_ref()) {
        Some(StageDetail::Damage(detail)) => detail.adjusted_estimate,
        Some(_) | None => 0,
    }
}

/// Fold completed stage results into the final decision
pub fn summarize(stages: &[ClaimStageResult]) -> Decision {
    let fraud_score = stage_score(stages, StageName::FraudDetection);
    let policy_valid = policy_validity(stages);
    let document_score = stage_score(stages, StageName::DocumentVerifier);
    let repair_estimate = adjusted_estimate(stages) as f64;

    let mut approved = true;
    let mut reason = APPROVED_REASON.to_string();
    let mut conditions: Vec<String> = Vec::new();

    if !policy_valid {
        approved = false;
        reason = POLICY_NOT_ACTIVE_MESSAGE.to_string();
    } else if fraud_score >= FRAUD_DENIAL_THRESHOLD {
        approved = false;
        reason = FRAUD_DENIAL_REASON.to_string();
    } else if fraud_score > FRAUD_ADVISORY_THRESHOLD {
        conditions.extend(ADVISORY_CONDITIONS.iter().map(|c| c.to_string()));
    }

    if document_score < WEAK_DOCUMENTATION_THRESHOLD && approved {
        conditions.push(WEAK_DOCUMENTATION_CONDITION.to_string());
    }

    let estimated_payout = if approved {
        (repair_estimate - STANDARD_DEDUCTIBLE).max(0.0)
    } else {
        0.0
    };

    let next_steps = if approved {
        APPROVAL_NEXT_STEPS.iter().map(|s| s.to_string()).collect()
    } else {
        DENIAL_NEXT_STEPS.iter().map(|s| s.to_string()).collect()
    };

    info!(approved, fraud_score, estimated_payout, "claim decision settled");

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CostBreakdown, CoverageSummary, DamageDetail, FraudDetail, PolicyDetail, PolicyWindow,
        Repairability, RiskLevel,
    };
    use stage_flow::{STAGE_FAILED_MESSAGE, StageOutput, StageResult};

    fn completed(name: StageName, score: u8, detail: StageDetail) -> ClaimStageResult {
        StageResult::completed(name.as_str(), StageOutput::new(score, "test", detail))
    }

    fn fraud_result(score: u8) -> ClaimStageResult {
        completed(
            StageName::FraudDetection,
            score,
            StageDetail::Fraud(FraudDetail {
                risk_score: score,
                risk_factors: Vec::new(),
                risk_level: RiskLevel::from_score(score),
            }),
        )
    }

    fn policy_result(policy_valid: bool) -> ClaimStageResult {
        completed(
            StageName::PolicyMatcher,
            if policy_valid { 100 } else { 0 },
            StageDetail::Policy(PolicyDetail {
                policy_valid,
                coverage: CoverageSummary::standard(),
                policy_period: PolicyWindow::reference(),
            }),
        )
    }

    fn damage_result(adjusted_estimate: i64) -> ClaimStageResult {
        completed(
            StageName::DamageEstimator,
            90,
            StageDetail::Damage(DamageDetail {
                original_estimate: adjusted_estimate as f64,
                adjusted_estimate,
                breakdown: CostBreakdown {
                    labor: (adjusted_estimate as f64 * 0.4).round() as i64,
                    parts: (adjusted_estimate as f64 * 0.6).round() as i64,
                },
                vehicle_age: 5,
                repairability: Repairability::Standard,
            }),
        )
    }

    fn document_result(score: u8) -> ClaimStageResult {
        completed(
            StageName::DocumentVerifier,
            score,
            StageDetail::Documents(crate::models::DocumentDetail {
                documents_present: score > 0,
                document_types: Vec::new(),
                verification_score: score,
            }),
        )
    }

    fn healthy_run() -> Vec<ClaimStageResult> {
        vec![
            document_result(90),
            fraud_result(5),
            policy_result(true),
            damage_result(45_000),
        ]
    }

    #[test]
    fn clean_runs_are_approved_with_the_deductible_applied() {
        let decision = summarize(&healthy_run());

        assert!(decision.approved);
        assert_eq!(decision.reason, APPROVED_REASON);
        assert_eq!(decision.estimated_payout, 44_500.0);
        assert_eq!(decision.conditions, None);
        assert_eq!(decision.next_steps.len(), 3);
        assert!(decision.policy_valid);
    }

    #[test]
    fn invalid_policy_denies_before_fraud_is_considered() {
        let mut stages = healthy_run();
        stages[2] = policy_result(false);
        stages[1] = fraud_result(100);

        let decision = summarize(&stages);

        assert!(!decision.approved);
        assert_eq!(decision.reason, POLICY_NOT_ACTIVE_MESSAGE);
        assert_eq!(decision.estimated_payout, 0.0);
        assert_eq!(decision.next_steps.len(), 2);
    }

    #[test]
    fn fraud_at_the_denial_threshold_denies_the_claim() {
        let mut stages = healthy_run();
        stages[1] = fraud_result(50);

        let decision = summarize(&stages);

        assert!(!decision.approved);
        assert_eq!(decision.reason, FRAUD_DENIAL_REASON);
        assert_eq!(decision.estimated_payout, 0.0);
        assert_eq!(decision.conditions, None);
    }

    #[test]
    fn elevated_fraud_alone_adds_the_advisory_pair() {
        let mut stages = healthy_run();
        stages[1] = fraud_result(35);

        let decision = summarize(&stages);

        assert!(decision.approved);
        assert_eq!(
            decision.conditions,
            Some(vec![
                "Additional documentation required".to_string(),
                "Subject to further verification".to_string(),
            ])
        );
        assert_eq!(decision.estimated_payout, 44_500.0);
    }

    #[test]
    fn elevated_fraud_and_weak_documents_stack_conditions() {
        let mut stages = healthy_run();
        stages[0] = document_result(30);
        stages[1] = fraud_result(35);

        let decision = summarize(&stages);

        assert!(decision.approved);
        let conditions = decision.conditions.expect("conditions expected");
        assert_eq!(
            conditions,
            vec![
                "Additional documentation required",
                "Subject to further verification",
                "Must provide additional supporting documents",
            ]
        );
    }

    #[test]
    fn small_estimates_never_pay_out_below_zero() {
        let mut stages = healthy_run();
        stages[3] = damage_result(300);

        let decision = summarize(&stages);

        assert!(decision.approved);
        assert_eq!(decision.estimated_payout, 0.0);
    }

    #[test]
    fn an_empty_run_is_denied_by_default() {
        let decision = summarize(&[]);

        assert!(!decision.approved);
        assert_eq!(decision.reason, POLICY_NOT_ACTIVE_MESSAGE);
        assert_eq!(decision.fraud_score, 0);
        assert_eq!(decision.estimated_payout, 0.0);
    }

    #[test]
    fn failed_stages_contribute_their_defaults() {
        let mut stages = healthy_run();
        stages[3] = StageResult::failed(StageName::DamageEstimator.as_str(), STAGE_FAILED_MESSAGE);

        let decision = summarize(&stages);

        // approval logic is untouched, but there is no estimate to pay against
        assert!(decision.approved);
        assert_eq!(decision.estimated_payout, 0.0);
    }
}
