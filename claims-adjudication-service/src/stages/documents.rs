use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use stage_flow::{Result, Stage, StageOutput};
use tracing::info;

use crate::models::{ClaimRecord, DocumentDetail, StageDetail, StageName};

const POINTS_PER_DOCUMENT_TYPE: u32 = 20;
const POLICE_REPORT_BONUS: u32 = 30;
const WITNESS_BONUS: u32 = 20;

/// Stage that scores the evidence attached to the claim
pub struct DocumentVerifierStage;

fn verification_score(claim: &ClaimRecord) -> u8 {
    // Duplicate tags don't add evidence
    let distinct_types: BTreeSet<&str> =
        claim.document_types.iter().map(String::as_str).collect();

    let mut score = if claim.has_documents {
        distinct_types.len() as u32 * POINTS_PER_DOCUMENT_TYPE
    } else {
        0
    };
    if claim.police_report_filed {
        score += POLICE_REPORT_BONUS;
    }
    if claim.witnesses_present {
        score += WITNESS_BONUS;
    }
    score.min(100) as u8
}

fn verification_message(score: u8) -> &'static str {
    if score > 70 {
        "Strong document verification"
    } else if score > 40 {
        "Moderate document verification"
    } else {
        "Insufficient documentation"
    }
}

#[async_trait]
impl Stage<ClaimRecord, StageDetail> for DocumentVerifierStage {
    fn name(&self) -> &str {
        StageName::DocumentVerifier.as_str()
    }

    fn pacing_delay(&self) -> Duration {
        Duration::from_millis(2000)
    }

    async fn evaluate(&self, claim: &ClaimRecord) -> Result<StageOutput<StageDetail>> {
        info!("running stage: {}", self.name());

        let score = verification_score(claim);

        Ok(StageOutput::new(
            score,
            verification_message(score),
            StageDetail::Documents(DocumentDetail {
                documents_present: claim.has_documents,
                document_types: claim.document_types.clone(),
                verification_score: score,
            }),
        ))
    }
}
