//! HR desk: lecturer records and claim reports

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use core_kernel::{ClaimId, PortError, UserId};

use crate::access::{authorize, Caller, Operation, Role};
use crate::claim::ClaimStatus;
use crate::error::ClaimError;
use crate::lecturer::{LecturerProfile, LecturerUpdate};
use crate::ports::{ClaimStore, LecturerDirectory};
use crate::report::{ClaimReport, RenderedReport, ReportRenderer};

/// Operations available to HR staff
#[derive(Clone)]
pub struct HrDesk {
    claims: Arc<dyn ClaimStore>,
    directory: Arc<dyn LecturerDirectory>,
    renderer: Arc<dyn ReportRenderer>,
}

impl HrDesk {
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        directory: Arc<dyn LecturerDirectory>,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        Self {
            claims,
            directory,
            renderer,
        }
    }

    /// Lists every lecturer, ordered by name
    pub async fn list_lecturers(&self, caller: &Caller) -> Result<Vec<LecturerProfile>, ClaimError> {
        authorize(&caller.roles, Operation::ListLecturers)?;
        Ok(self.directory.list_with_role(Role::Lecturer).await?)
    }

    /// Updates a lecturer's name and email
    #[instrument(skip(self, update), fields(user = %caller.user_id))]
    pub async fn edit_lecturer(
        &self,
        caller: &Caller,
        lecturer_id: UserId,
        update: LecturerUpdate,
    ) -> Result<LecturerProfile, ClaimError> {
        authorize(&caller.roles, Operation::EditLecturer)?;
        let update = update.validated()?;

        let profile = self
            .directory
            .update_profile(lecturer_id, &update)
            .await
            .map_err(|e| match e {
                PortError::NotFound { .. } => ClaimError::LecturerNotFound(lecturer_id),
                other => other.into(),
            })?;

        info!(lecturer = %lecturer_id, "Lecturer record updated");
        Ok(profile)
    }

    /// Builds the report for an approved claim
    pub async fn claim_report(&self, caller: &Caller, claim_id: ClaimId) -> Result<ClaimReport, ClaimError> {
        authorize(&caller.roles, Operation::GenerateReport)?;

        let entry = self
            .claims
            .get_with_owner(claim_id)
            .await?
            .ok_or(ClaimError::ClaimNotFound(claim_id))?;

        if entry.claim.status() != ClaimStatus::Approved {
            return Err(ClaimError::ReportUnavailable(entry.claim.status()));
        }

        Ok(ClaimReport::build(&entry, Utc::now()))
    }

    /// Renders the report for an approved claim as a downloadable document
    #[instrument(skip(self), fields(user = %caller.user_id))]
    pub async fn render_report(
        &self,
        caller: &Caller,
        claim_id: ClaimId,
    ) -> Result<RenderedReport, ClaimError> {
        let report = self.claim_report(caller, claim_id).await?;
        let rendered = self.renderer.render(&report)?;

        info!(
            claim_id = %claim_id,
            bytes = rendered.bytes.len(),
            "Claim report generated"
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::RoleSet;
    use crate::claim::ClaimSubmission;
    use crate::ports::mock::{MockClaimStore, MockLecturerDirectory};
    use crate::report::HtmlReportRenderer;
    use crate::validation::ValidClaimFields;
    use rust_decimal_macros::dec;

    async fn desk() -> (HrDesk, MockClaimStore, LecturerProfile) {
        let directory = MockLecturerDirectory::new();
        let lecturer = LecturerProfile {
            id: UserId::new(),
            full_name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            department: "Computing".to_string(),
        };
        directory.add_user(lecturer.clone(), Role::Lecturer.into()).await;
        directory
            .add_user(
                LecturerProfile {
                    id: UserId::new(),
                    full_name: "Hannah Manager".to_string(),
                    email: "hannah@example.com".to_string(),
                    department: "Computing".to_string(),
                },
                RoleSet::from(Role::AcademicManager),
            )
            .await;

        let store = MockClaimStore::new(directory.clone());
        let renderer = HtmlReportRenderer::new("Contract Claims").unwrap();
        let desk = HrDesk::new(Arc::new(store.clone()), Arc::new(directory), Arc::new(renderer));
        (desk, store, lecturer)
    }

    fn hr() -> Caller {
        Caller::new(UserId::new(), Role::Hr)
    }

    #[tokio::test]
    async fn test_list_lecturers_only_lists_lecturers() {
        let (desk, _, lecturer) = desk().await;
        let lecturers = desk.list_lecturers(&hr()).await.unwrap();
        assert_eq!(lecturers, vec![lecturer]);
    }

    #[tokio::test]
    async fn test_edit_unknown_lecturer() {
        let (desk, _, _) = desk().await;
        let err = desk
            .edit_lecturer(
                &hr(),
                UserId::new(),
                LecturerUpdate {
                    full_name: "Nobody".to_string(),
                    email: "nobody@example.com".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::LecturerNotFound(_)));
    }

    #[tokio::test]
    async fn test_report_requires_approved_claim() {
        let (desk, store, lecturer) = desk().await;
        let claim = ClaimSubmission::submit(
            lecturer.id,
            ValidClaimFields {
                hours_worked: dec!(3),
                hourly_rate: dec!(50),
                additional_notes: None,
            },
            None,
        );
        store.insert(&claim).await.unwrap();

        let err = desk.claim_report(&hr(), claim.id()).await.unwrap_err();
        assert!(matches!(err, ClaimError::ReportUnavailable(ClaimStatus::Pending)));

        store
            .update_status(claim.id(), ClaimStatus::Pending, ClaimStatus::Approved, UserId::new())
            .await
            .unwrap();
        let rendered = desk.render_report(&hr(), claim.id()).await.unwrap();
        assert!(String::from_utf8(rendered.bytes).unwrap().contains("Grace Hopper"));
    }

    #[tokio::test]
    async fn test_lecturer_cannot_use_hr_desk() {
        let (desk, _, lecturer) = desk().await;
        let caller = Caller::new(lecturer.id, Role::Lecturer);
        assert!(matches!(
            desk.list_lecturers(&caller).await.unwrap_err(),
            ClaimError::Forbidden(_)
        ));
    }
}
