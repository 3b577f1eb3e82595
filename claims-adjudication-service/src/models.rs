use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use stage_flow::StageResult;
use std::fmt;
use uuid::Uuid;

/// Deductible applied by the standard coverage, in rupees
pub const STANDARD_DEDUCTIBLE: f64 = 500.0;

/// Stage results for claim evaluations carry [`StageDetail`] findings
pub type ClaimStageResult = StageResult<StageDetail>;

/// A first-notice-of-loss claim as submitted by the claimant
///
/// Free-text fields default to empty strings so a partially filled
/// submission still evaluates; completeness is scored by the intake stage
/// rather than rejected up front.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimRecord {
    pub policy_number: String,
    pub claimant_name: String,
    pub phone: String,
    pub email: String,
    pub incident_date: Option<NaiveDate>,
    pub incident_time: Option<NaiveTime>,
    pub location: String,
    pub description: String,
    pub vehicle_year: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub license_plate: String,
    pub estimated_damage: f64,
    pub has_documents: bool,
    pub document_types: Vec<String>,
    pub police_report_filed: bool,
    pub witnesses_present: bool,
    pub previous_claims: u32,
    pub policy_validity_start: Option<NaiveDate>,
    pub policy_validity_end: Option<NaiveDate>,
}

/// The five evaluation stages, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageName {
    Intake,
    DocumentVerifier,
    FraudDetection,
    PolicyMatcher,
    DamageEstimator,
}

impl StageName {
    pub const ALL: [StageName; 5] = [
        StageName::Intake,
        StageName::DocumentVerifier,
        StageName::FraudDetection,
        StageName::PolicyMatcher,
        StageName::DamageEstimator,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            StageName::Intake => "Intake Agent",
            StageName::DocumentVerifier => "Document Verifier Agent",
            StageName::FraudDetection => "Fraud Detection Agent",
            StageName::PolicyMatcher => "Policy Matcher Agent",
            StageName::DamageEstimator => "Damage Estimator Agent",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured findings a stage can attach to its result, one arm per stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageDetail {
    Intake(IntakeDetail),
    Documents(DocumentDetail),
    Fraud(FraudDetail),
    Policy(PolicyDetail),
    Damage(DamageDetail),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeDetail {
    pub structured: bool,
    pub missing_fields: Vec<String>,
    pub completeness: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub documents_present: bool,
    pub document_types: Vec<String>,
    pub verification_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudDetail {
    pub risk_score: u8,
    pub risk_factors: Vec<String>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Band a 0-100 fraud risk score
    pub fn from_score(score: u8) -> Self {
        if score > 60 {
            RiskLevel::High
        } else if score > 30 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub collision: bool,
    pub comprehensive: bool,
    pub liability: bool,
    pub deductible: f64,
}

impl CoverageSummary {
    pub fn standard() -> Self {
        Self {
            collision: true,
            comprehensive: true,
            liability: true,
            deductible: STANDARD_DEDUCTIBLE,
        }
    }
}

/// Inclusive date range a policy is active for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PolicyWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The coverage period used when no policy system is wired in
    pub fn reference() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid coverage start"),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid coverage end"),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDetail {
    pub policy_valid: bool,
    pub coverage: CoverageSummary,
    pub policy_period: PolicyWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub labor: i64,
    pub parts: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageDetail {
    pub original_estimate: f64,
    pub adjusted_estimate: i64,
    pub breakdown: CostBreakdown,
    pub vehicle_age: i32,
    pub repairability: Repairability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Repairability {
    Standard,
    Challenging,
}

/// Final adjudication produced once every stage has settled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub approved: bool,
    pub reason: String,
    pub fraud_score: u8,
    pub policy_valid: bool,
    pub estimated_payout: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Processing,
    Completed,
}

/// Which evaluation path produced the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    Local,
    Remote,
}

/// What an evaluator hands back once a claim has been fully processed
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub mode: EvaluationMode,
    pub stages: Vec<ClaimStageResult>,
    pub decision: Decision,
}

/// A single claim evaluation run, persisted across its lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: String,
    pub reference: String,
    pub claim: ClaimRecord,
    pub mode: EvaluationMode,
    pub status: EvaluationStatus,
    pub stages: Vec<ClaimStageResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Evaluation {
    pub fn new(claim: ClaimRecord, mode: EvaluationMode) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            reference: format!("CLM-{:08X}", rand::random::<u32>()),
            claim,
            mode,
            status: EvaluationStatus::Processing,
            stages: Vec::new(),
            decision: None,
            submitted_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn complete(&mut self, outcome: EvaluationOutcome) {
        self.mode = outcome.mode;
        self.stages = outcome.stages;
        self.decision = Some(outcome.decision);
        self.status = EvaluationStatus::Completed;
        self.completed_at = Some(Utc::now());
    }
}
