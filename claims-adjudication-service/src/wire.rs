//! Flattens a claim into the line-oriented `Key: Value` text block the
//! remote scoring service expects.

use chrono::{NaiveDate, NaiveTime};

use crate::currency::format_amount;
use crate::models::ClaimRecord;

fn date_text(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn time_text(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// One `Key: Value` line per claim field, joined with newlines
///
/// Labels and ordering are part of the scoring service's contract and must
/// not change.
pub fn to_scoring_payload(claim: &ClaimRecord) -> String {
    let supporting_documents = if claim.has_documents {
        claim.document_types.join(", ")
    } else {
        "none".to_string()
    };

    let lines = [
        format!("Policy Number: {}", claim.policy_number),
        format!("Claimant Name: {}", claim.claimant_name),
        format!("Phone Number: {}", claim.phone),
        format!("Email: {}", claim.email),
        format!("Incident Date: {}", date_text(claim.incident_date)),
        format!("Incident Time: {}", time_text(claim.incident_time)),
        format!("Location: {}", claim.location),
        format!("Description: {}", claim.description),
        format!("Vehicle Year: {}", claim.vehicle_year),
        format!("Vehicle Make: {}", claim.vehicle_make),
        format!("Vehicle Model: {}", claim.vehicle_model),
        format!("License Plate: {}", claim.license_plate),
        format!("Claim Amount: {}", format_amount(claim.estimated_damage)),
        format!("Supporting Documents: {}", supporting_documents),
        format!("Police Report Filed: {}", yes_no(claim.police_report_filed)),
        format!("Witnesses Present: {}", yes_no(claim.witnesses_present)),
        format!("Previous Claims: {}", claim.previous_claims),
        format!(
            "Policy Validity: {} to {}",
            date_text(claim.policy_validity_start),
            date_text(claim.policy_validity_end)
        ),
    ];

    lines.join("\n")
}
