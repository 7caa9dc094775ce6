//! Claim aggregate

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, UserId};
use crate::attachment::AttachmentRef;
use crate::error::ClaimError;
use crate::validation::ValidClaimFields;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Awaiting a decision by an academic manager
    Pending,
    /// Approved for payment
    Approved,
    /// Rejected
    Rejected,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 3] = [
        ClaimStatus::Pending,
        ClaimStatus::Approved,
        ClaimStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "Pending",
            ClaimStatus::Approved => "Approved",
            ClaimStatus::Rejected => "Rejected",
        }
    }

    /// Approved and Rejected have no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClaimStatus::Pending)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown claim status: {}", s))
    }
}

/// Decision an academic manager can take on a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimAction {
    Approve,
    Reject,
}

impl ClaimAction {
    /// Status the claim ends up in after the action
    pub fn target_status(&self) -> ClaimStatus {
        match self {
            ClaimAction::Approve => ClaimStatus::Approved,
            ClaimAction::Reject => ClaimStatus::Rejected,
        }
    }
}

/// A lecturer's claim for payment of worked hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSubmission {
    id: ClaimId,
    owner_id: UserId,
    hours_worked: Decimal,
    hourly_rate: Decimal,
    additional_notes: Option<String>,
    submitted_at: DateTime<Utc>,
    status: ClaimStatus,
    supporting_document: Option<AttachmentRef>,
}

impl ClaimSubmission {
    /// Creates a new pending claim owned by the submitting lecturer
    pub fn submit(
        owner_id: UserId,
        fields: ValidClaimFields,
        supporting_document: Option<AttachmentRef>,
    ) -> Self {
        Self {
            id: ClaimId::new_v7(),
            owner_id,
            hours_worked: fields.hours_worked,
            hourly_rate: fields.hourly_rate,
            additional_notes: fields.additional_notes,
            submitted_at: Utc::now(),
            status: ClaimStatus::Pending,
            supporting_document,
        }
    }

    /// Rebuilds a claim from persisted state
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ClaimId,
        owner_id: UserId,
        hours_worked: Decimal,
        hourly_rate: Decimal,
        additional_notes: Option<String>,
        submitted_at: DateTime<Utc>,
        status: ClaimStatus,
        supporting_document: Option<AttachmentRef>,
    ) -> Self {
        Self {
            id,
            owner_id,
            hours_worked,
            hourly_rate,
            additional_notes,
            submitted_at,
            status,
            supporting_document,
        }
    }

    pub fn id(&self) -> ClaimId {
        self.id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn hours_worked(&self) -> Decimal {
        self.hours_worked
    }

    pub fn hourly_rate(&self) -> Decimal {
        self.hourly_rate
    }

    pub fn additional_notes(&self) -> Option<&str> {
        self.additional_notes.as_deref()
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    pub fn supporting_document(&self) -> Option<&AttachmentRef> {
        self.supporting_document.as_ref()
    }

    /// Amount payable: hours worked times hourly rate
    ///
    /// Saturates at `Decimal::MAX` instead of panicking for restored records
    /// whose amounts exceed the validation bounds.
    pub fn final_payment(&self) -> Decimal {
        self.hours_worked.saturating_mul(self.hourly_rate)
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Applies a manager decision, moving the claim out of Pending
    ///
    /// # Errors
    ///
    /// `InvalidStatusTransition` when the claim has already been decided
    pub fn apply(&mut self, action: ClaimAction) -> Result<ClaimStatus, ClaimError> {
        let target = action.target_status();
        if !self.can_transition_to(target) {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(target)
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Pending, Approved) | (Pending, Rejected)
        )
    }
}
