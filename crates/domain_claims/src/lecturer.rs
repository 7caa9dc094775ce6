//! Lecturer records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::UserId;
use crate::claim::ClaimSubmission;
use crate::error::ClaimError;
use crate::validation::FieldError;

/// Profile data of a user as held by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LecturerProfile {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub department: String,
}

impl LecturerProfile {
    /// Name to show on screens and reports
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

/// Changes HR can make to a lecturer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LecturerUpdate {
    #[validate(length(min = 1, max = 200, message = "Full name is required."))]
    pub full_name: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
}

impl LecturerUpdate {
    /// Trims the input and checks it
    ///
    /// # Errors
    ///
    /// `ClaimError::Validation` with one entry per failing field
    pub fn validated(self) -> Result<Self, ClaimError> {
        let update = Self {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
        };

        update.validate().map_err(|errors| {
            let mut fields: Vec<FieldError> = errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |e| {
                        let message = e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid {}.", field));
                        FieldError::new(field.to_string(), message)
                    })
                })
                .collect();
            fields.sort_by(|a, b| a.field.cmp(&b.field));
            ClaimError::Validation(fields)
        })?;

        Ok(update)
    }
}

/// A claim joined with its owning lecturer's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimWithOwner {
    pub claim: ClaimSubmission,
    pub owner: LecturerProfile,
}

impl ClaimWithOwner {
    pub fn final_payment(&self) -> Decimal {
        self.claim.final_payment()
    }
}
