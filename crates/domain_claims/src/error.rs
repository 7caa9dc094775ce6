//! Claims domain errors

use thiserror::Error;

use core_kernel::{ClaimId, PortError, UserId};

use crate::attachment::AttachmentError;
use crate::claim::ClaimStatus;
use crate::report::ReportError;
use crate::validation::FieldError;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Validation failed: {}", FieldError::join(.0))]
    Validation(Vec<FieldError>),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Claim not found: {0}")]
    ClaimNotFound(ClaimId),

    #[error("Lecturer not found: {0}")]
    LecturerNotFound(UserId),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: ClaimStatus, to: ClaimStatus },

    #[error("Claim {id} is {status} and no longer accepts documents")]
    ClaimClosed { id: ClaimId, status: ClaimStatus },

    #[error("Report requires an approved claim, claim is {0}")]
    ReportUnavailable(ClaimStatus),

    #[error("Attachment storage failed: {0}")]
    Storage(#[from] AttachmentError),

    #[error("Report rendering failed: {0}")]
    Report(#[from] ReportError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl ClaimError {
    /// Creates a validation error for a single field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ClaimError::Validation(vec![FieldError::new(field, message)])
    }

    /// Returns the field-level problems of a validation error
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ClaimError::Validation(errors) => errors,
            _ => &[],
        }
    }

    /// Checks if this error indicates a missing claim or lecturer
    pub fn is_not_found(&self) -> bool {
        match self {
            ClaimError::ClaimNotFound(_) | ClaimError::LecturerNotFound(_) => true,
            ClaimError::Port(port) => port.is_not_found(),
            _ => false,
        }
    }

    /// Checks if this error conflicts with the current state of the claim
    pub fn is_conflict(&self) -> bool {
        match self {
            ClaimError::InvalidStatusTransition { .. }
            | ClaimError::ClaimClosed { .. }
            | ClaimError::ReportUnavailable(_) => true,
            ClaimError::Port(port) => port.is_conflict(),
            _ => false,
        }
    }
}
