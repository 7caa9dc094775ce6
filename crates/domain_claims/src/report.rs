//! Claim reports
//!
//! HR produces a printable report for every approved claim. [`ClaimReport`]
//! holds the figures; a [`ReportRenderer`] turns it into a downloadable
//! document. The shipped [`HtmlReportRenderer`] fills an embedded Tera
//! template, and converting that HTML to PDF is left to the client.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use core_kernel::ClaimId;

use crate::claim::ClaimStatus;
use crate::lecturer::ClaimWithOwner;

const TEMPLATE_NAME: &str = "claim_report.html";

/// Name shown when the owning lecturer has no usable name
pub const UNKNOWN_LECTURER: &str = "Unknown";

/// Report rendering errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("template error: {0}")]
    Template(String),
}

impl From<tera::Error> for ReportError {
    fn from(e: tera::Error) -> Self {
        ReportError::Template(e.to_string())
    }
}

/// Figures shown on a claim report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimReport {
    pub claim_id: ClaimId,
    pub lecturer_name: String,
    pub submitted_at: DateTime<Utc>,
    pub status: ClaimStatus,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    /// Hours times rate, rounded half away from zero to cents
    pub total_payment: Decimal,
    pub additional_notes: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl ClaimReport {
    /// Builds the report for a claim at the given time
    pub fn build(entry: &ClaimWithOwner, generated_at: DateTime<Utc>) -> Self {
        let claim = &entry.claim;
        let name = entry.owner.full_name.trim();

        Self {
            claim_id: claim.id(),
            lecturer_name: if name.is_empty() {
                UNKNOWN_LECTURER.to_string()
            } else {
                name.to_string()
            },
            submitted_at: claim.submitted_at(),
            status: claim.status(),
            hours_worked: claim.hours_worked(),
            hourly_rate: claim.hourly_rate(),
            total_payment: claim
                .final_payment()
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            additional_notes: claim.additional_notes().map(str::to_string),
            generated_at,
        }
    }

    /// File name offered for download
    pub fn file_name(&self, extension: &str) -> String {
        format!("ClaimReport_{}.{}", self.claim_id.as_uuid(), extension)
    }
}

/// A rendered report ready to send to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Turns a report into a document
pub trait ReportRenderer: Send + Sync {
    fn render(&self, report: &ClaimReport) -> Result<RenderedReport, ReportError>;
}

/// Template values, pre-formatted for display
#[derive(Serialize)]
struct ReportView<'a> {
    claim_id: String,
    lecturer_name: &'a str,
    submitted_on: String,
    status: &'static str,
    hours_worked: String,
    hourly_rate: String,
    total_payment: String,
    additional_notes: Option<&'a str>,
    generated_at: String,
}

impl<'a> From<&'a ClaimReport> for ReportView<'a> {
    fn from(report: &'a ClaimReport) -> Self {
        Self {
            claim_id: report.claim_id.to_string(),
            lecturer_name: &report.lecturer_name,
            submitted_on: report.submitted_at.format("%Y-%m-%d").to_string(),
            status: report.status.as_str(),
            hours_worked: report.hours_worked.normalize().to_string(),
            hourly_rate: money(report.hourly_rate),
            total_payment: money(report.total_payment),
            additional_notes: report.additional_notes.as_deref(),
            generated_at: report.generated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn money(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Renders reports to HTML with an embedded template
#[derive(Debug, Clone)]
pub struct HtmlReportRenderer {
    tera: Tera,
    organisation: String,
}

impl HtmlReportRenderer {
    pub fn new(organisation: impl Into<String>) -> Result<Self, ReportError> {
        let mut tera = Tera::default();
        tera.add_raw_template(
            TEMPLATE_NAME,
            include_str!("../templates/claim_report.html.tera"),
        )?;

        Ok(Self {
            tera,
            organisation: organisation.into(),
        })
    }
}

impl ReportRenderer for HtmlReportRenderer {
    fn render(&self, report: &ClaimReport) -> Result<RenderedReport, ReportError> {
        let mut context = Context::new();
        context.insert("organisation", &self.organisation);
        context.insert("report", &ReportView::from(report));

        let html = self.tera.render(TEMPLATE_NAME, &context)?;

        Ok(RenderedReport {
            file_name: report.file_name("html"),
            content_type: "text/html; charset=utf-8",
            bytes: html.into_bytes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::{ClaimAction, ClaimSubmission};
    use crate::lecturer::LecturerProfile;
    use crate::validation::ValidClaimFields;
    use core_kernel::UserId;
    use rust_decimal_macros::dec;

    fn approved(name: &str, hours: Decimal, rate: Decimal, notes: Option<&str>) -> ClaimWithOwner {
        let owner = LecturerProfile {
            id: UserId::new(),
            full_name: name.to_string(),
            email: "lecturer@example.com".to_string(),
            department: "Physics".to_string(),
        };
        let mut claim = ClaimSubmission::submit(
            owner.id,
            ValidClaimFields {
                hours_worked: hours,
                hourly_rate: rate,
                additional_notes: notes.map(str::to_string),
            },
            None,
        );
        claim.apply(ClaimAction::Approve).unwrap();
        ClaimWithOwner { claim, owner }
    }

    #[test]
    fn test_total_is_rounded_to_cents() {
        let report = ClaimReport::build(&approved("Ada", dec!(1.5), dec!(10.333), None), Utc::now());
        assert_eq!(report.total_payment, dec!(15.50));
    }

    #[test]
    fn test_missing_name_shows_unknown() {
        let report = ClaimReport::build(&approved("  ", dec!(1), dec!(1), None), Utc::now());
        assert_eq!(report.lecturer_name, UNKNOWN_LECTURER);
    }

    #[test]
    fn test_render_html() {
        let renderer = HtmlReportRenderer::new("Contract Claims").unwrap();
        let report = ClaimReport::build(
            &approved("Ada Lovelace", dec!(10), dec!(20), Some("October <marking>")),
            Utc::now(),
        );

        let rendered = renderer.render(&report).unwrap();
        let html = String::from_utf8(rendered.bytes).unwrap();

        assert_eq!(
            rendered.file_name,
            format!("ClaimReport_{}.html", report.claim_id.as_uuid())
        );
        assert!(rendered.content_type.starts_with("text/html"));
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("200.00"));
        assert!(html.contains("status-approved"));
        assert!(html.contains("October &lt;marking&gt;"));
    }

    #[test]
    fn test_notes_section_omitted_without_notes() {
        let renderer = HtmlReportRenderer::new("Contract Claims").unwrap();
        let report = ClaimReport::build(&approved("Ada", dec!(1), dec!(1), None), Utc::now());
        let html = String::from_utf8(renderer.render(&report).unwrap().bytes).unwrap();
        assert!(!html.contains("Additional Notes"));
    }
}
