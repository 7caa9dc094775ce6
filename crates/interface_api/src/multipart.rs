//! Multipart form parsing for claim submissions and document uploads

use std::str::FromStr;

use axum::extract::Multipart;
use rust_decimal::Decimal;
use tracing::debug;

use domain_claims::{ClaimFields, ClaimValidator, FieldError, Upload};

use crate::error::ApiError;

/// Form field carrying the supporting document of a new claim
pub const SUPPORTING_DOCUMENT_FIELD: &str = "supporting_document";
/// Form field carrying each appended file
pub const FILES_FIELD: &str = "files";

/// A parsed claim submission form
#[derive(Debug, Default)]
pub struct ClaimForm {
    pub fields: ClaimFields,
    pub document: Option<Upload>,
}

/// Reads a claim submission form
///
/// Numbers that cannot be parsed are reported together with the other field
/// problems, so the client sees every issue in one response.
pub async fn read_claim_form(mut multipart: Multipart) -> Result<ClaimForm, ApiError> {
    let mut form = ClaimForm::default();
    let mut parse_errors = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "hours_worked" => {
                let text = field.text().await?;
                form.fields.hours_worked =
                    parse_amount(&text, "hours_worked", "Hours worked", &mut parse_errors);
            }
            "hourly_rate" => {
                let text = field.text().await?;
                form.fields.hourly_rate =
                    parse_amount(&text, "hourly_rate", "Hourly rate", &mut parse_errors);
            }
            "additional_notes" => {
                let text = field.text().await?;
                let text = text.trim();
                form.fields.additional_notes = (!text.is_empty()).then(|| text.to_string());
            }
            SUPPORTING_DOCUMENT_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await?;
                if !file_name.is_empty() {
                    form.document = Some(Upload::new(file_name, content.to_vec()));
                }
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    if !parse_errors.is_empty() {
        let mut errors: Vec<FieldError> = ClaimValidator::check(&form.fields)
            .errors
            .into_iter()
            .filter(|e| !parse_errors.iter().any(|p: &FieldError| p.field == e.field))
            .collect();
        errors.extend(parse_errors);
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        return Err(ApiError::Validation(errors));
    }

    Ok(form)
}

/// Reads every file sent under the `files` field
pub async fn read_files(mut multipart: Multipart) -> Result<Vec<Upload>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            debug!(field = ?field.name(), "Ignoring unknown form field");
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await?;
        files.push(Upload::new(file_name, content.to_vec()));
    }

    Ok(files)
}

fn parse_amount(
    text: &str,
    field: &str,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match Decimal::from_str(text) {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(field, format!("{} must be a number.", label)));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_accepts_decimals() {
        let mut errors = Vec::new();
        assert_eq!(
            parse_amount(" 7.5 ", "hours_worked", "Hours worked", &mut errors),
            Some(Decimal::new(75, 1))
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_parse_amount_blank_is_missing() {
        let mut errors = Vec::new();
        assert_eq!(parse_amount("  ", "hourly_rate", "Hourly rate", &mut errors), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_parse_amount_records_error() {
        let mut errors = Vec::new();
        assert_eq!(parse_amount("ten", "hours_worked", "Hours worked", &mut errors), None);
        assert_eq!(errors, vec![FieldError::new("hours_worked", "Hours worked must be a number.")]);
    }
}
