//! Claims DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, UserId};
use domain_claims::{
    AppendOutcome, ClaimSubmission, ClaimWithOwner, StoredAttachment, Submission,
};

#[derive(Debug, Deserialize)]
pub struct ListClaimsQuery {
    /// `pending`, `approved` or `rejected`; defaults to pending
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: ClaimId,
    pub owner_id: UserId,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub final_payment: Decimal,
    pub additional_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub status: String,
    pub supporting_document: Option<String>,
}

impl From<&ClaimSubmission> for ClaimResponse {
    fn from(claim: &ClaimSubmission) -> Self {
        Self {
            id: claim.id(),
            owner_id: claim.owner_id(),
            hours_worked: claim.hours_worked(),
            hourly_rate: claim.hourly_rate(),
            final_payment: claim.final_payment(),
            additional_notes: claim.additional_notes().map(str::to_string),
            submitted_at: claim.submitted_at(),
            status: claim.status().to_string(),
            supporting_document: claim.supporting_document().map(|d| d.to_string()),
        }
    }
}

/// A claim with the name of the lecturer who submitted it
#[derive(Debug, Serialize)]
pub struct ClaimWithOwnerResponse {
    #[serde(flatten)]
    pub claim: ClaimResponse,
    pub lecturer_name: String,
    pub lecturer_email: String,
}

impl From<&ClaimWithOwner> for ClaimWithOwnerResponse {
    fn from(entry: &ClaimWithOwner) -> Self {
        Self {
            claim: ClaimResponse::from(&entry.claim),
            lecturer_name: entry.owner.display_name().to_string(),
            lecturer_email: entry.owner.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitClaimResponse {
    pub claim: ClaimResponse,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<Submission> for SubmitClaimResponse {
    fn from(submission: Submission) -> Self {
        Self {
            claim: ClaimResponse::from(&submission.claim),
            warnings: submission.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AppendResponse {
    pub claim_id: ClaimId,
    pub stored: Vec<StoredAttachment>,
    pub skipped: Vec<String>,
}

impl From<AppendOutcome> for AppendResponse {
    fn from(outcome: AppendOutcome) -> Self {
        Self {
            claim_id: outcome.claim_id,
            stored: outcome.stored,
            skipped: outcome.skipped,
        }
    }
}
