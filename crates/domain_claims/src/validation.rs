//! Claim field validation
//!
//! Validation accumulates every failing field into a [`ValidationResult`]
//! instead of stopping at the first problem, so a resubmitted form can show
//! all messages at once.
//!
//! # Rules
//!
//! - Hours worked is required, must not be negative and is at most
//!   [`MAX_HOURS_WORKED`]
//! - Hourly rate is required, must not be negative and is at most
//!   [`MAX_HOURLY_RATE`]
//! - Blank additional notes are treated as absent

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// Largest accepted hours worked on one claim
pub const MAX_HOURS_WORKED: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Largest accepted hourly rate
pub const MAX_HOURLY_RATE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// A problem with a single input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Joins several errors into one line for display
    pub fn join(errors: &[FieldError]) -> String {
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Merges another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// Converts into a `Validation` error when any field failed
    pub fn into_result(self) -> Result<(), ClaimError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ClaimError::Validation(self.errors))
        }
    }
}

/// Raw claim fields as received from a submission form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimFields {
    pub hours_worked: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub additional_notes: Option<String>,
}

/// Claim fields that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidClaimFields {
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub additional_notes: Option<String>,
}

/// Validator for claim submissions
pub struct ClaimValidator;

impl ClaimValidator {
    /// Collects every problem with the given fields
    pub fn check(fields: &ClaimFields) -> ValidationResult {
        let mut result = ValidationResult::ok();

        Self::check_amount(
            &mut result,
            "hours_worked",
            fields.hours_worked,
            MAX_HOURS_WORKED,
            "Hours worked is required.",
            "Hours worked cannot be negative.",
            "Hours worked cannot exceed 1000000.",
        );
        Self::check_amount(
            &mut result,
            "hourly_rate",
            fields.hourly_rate,
            MAX_HOURLY_RATE,
            "Hourly rate is required.",
            "Hourly rate cannot be negative.",
            "Hourly rate cannot exceed 1000000.",
        );

        result
    }

    /// Validates the fields and returns their checked form
    ///
    /// # Errors
    ///
    /// `ClaimError::Validation` listing every failing field
    pub fn validate(fields: ClaimFields) -> Result<ValidClaimFields, ClaimError> {
        Self::check(&fields).into_result()?;

        match (fields.hours_worked, fields.hourly_rate) {
            (Some(hours_worked), Some(hourly_rate)) => Ok(ValidClaimFields {
                hours_worked,
                hourly_rate,
                additional_notes: fields
                    .additional_notes
                    .map(|notes| notes.trim().to_string())
                    .filter(|notes| !notes.is_empty()),
            }),
            // check() already rejected missing amounts
            _ => Err(ClaimError::field("claim", "Incomplete claim fields.")),
        }
    }

    fn check_amount(
        result: &mut ValidationResult,
        field: &str,
        value: Option<Decimal>,
        max: Decimal,
        missing: &str,
        negative: &str,
        too_large: &str,
    ) {
        match value {
            None => result.add_error(field, missing),
            Some(v) if v.is_sign_negative() && !v.is_zero() => result.add_error(field, negative),
            Some(v) if v > max => result.add_error(field, too_large),
            Some(_) => {}
        }
    }
}
