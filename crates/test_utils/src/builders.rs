//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and get defaults for the rest.

use chrono::{DateTime, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClaimId, UserId};
use domain_claims::{AttachmentRef, ClaimFields, ClaimStatus, ClaimSubmission, LecturerProfile};

use crate::fixtures::{IdFixtures, SUBMITTED_AT};

/// Builder for claim form input
#[derive(Debug, Clone)]
pub struct ClaimFieldsBuilder {
    hours_worked: Option<Decimal>,
    hourly_rate: Option<Decimal>,
    additional_notes: Option<String>,
}

impl Default for ClaimFieldsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimFieldsBuilder {
    /// Ten hours at 20 per hour, no notes
    pub fn new() -> Self {
        Self {
            hours_worked: Some(dec!(10)),
            hourly_rate: Some(dec!(20)),
            additional_notes: None,
        }
    }

    pub fn with_hours(mut self, hours: Decimal) -> Self {
        self.hours_worked = Some(hours);
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.hourly_rate = Some(rate);
        self
    }

    pub fn without_hours(mut self) -> Self {
        self.hours_worked = None;
        self
    }

    pub fn without_rate(mut self) -> Self {
        self.hourly_rate = None;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.additional_notes = Some(notes.into());
        self
    }

    pub fn build(self) -> ClaimFields {
        ClaimFields {
            hours_worked: self.hours_worked,
            hourly_rate: self.hourly_rate,
            additional_notes: self.additional_notes,
        }
    }
}

/// Builder for stored claims in any status
#[derive(Debug, Clone)]
pub struct ClaimBuilder {
    id: ClaimId,
    owner_id: UserId,
    hours_worked: Decimal,
    hourly_rate: Decimal,
    additional_notes: Option<String>,
    submitted_at: DateTime<Utc>,
    status: ClaimStatus,
    supporting_document: Option<AttachmentRef>,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    /// A pending claim of the fixture lecturer for 10 h at 20
    pub fn new() -> Self {
        Self {
            id: ClaimId::new_v7(),
            owner_id: IdFixtures::lecturer_id(),
            hours_worked: dec!(10),
            hourly_rate: dec!(20),
            additional_notes: None,
            submitted_at: *SUBMITTED_AT,
            status: ClaimStatus::Pending,
            supporting_document: None,
        }
    }

    pub fn with_id(mut self, id: ClaimId) -> Self {
        self.id = id;
        self
    }

    pub fn owned_by(mut self, owner_id: UserId) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn with_hours(mut self, hours: Decimal) -> Self {
        self.hours_worked = hours;
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.hourly_rate = rate;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.additional_notes = Some(notes.into());
        self
    }

    pub fn submitted_at(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_at = at;
        self
    }

    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_document(mut self, reference: impl Into<String>) -> Self {
        self.supporting_document = Some(AttachmentRef::new(reference));
        self
    }

    pub fn build(self) -> ClaimSubmission {
        ClaimSubmission::restore(
            self.id,
            self.owner_id,
            self.hours_worked,
            self.hourly_rate,
            self.additional_notes,
            self.submitted_at,
            self.status,
            self.supporting_document,
        )
    }
}

/// Builder for lecturer profiles with generated names
#[derive(Debug, Clone)]
pub struct LecturerBuilder {
    id: UserId,
    full_name: String,
    email: String,
    department: String,
}

impl Default for LecturerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LecturerBuilder {
    /// A profile with a random id, name and email
    pub fn new() -> Self {
        Self {
            id: UserId::new(),
            full_name: Name().fake(),
            email: SafeEmail().fake(),
            department: "Computing".to_string(),
        }
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn build(self) -> LecturerProfile {
        LecturerProfile {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            department: self.department,
        }
    }
}
