//! Claim lifecycle engine
//!
//! [`ClaimWorkflow`] drives a claim from submission through a manager's
//! decision. It holds no state of its own: every operation is a single
//! read-modify-write against the [`ClaimStore`], whose compare-and-set on the
//! current status is the commit point.
//!
//! ```text
//! Pending -> Approved
//!         -> Rejected
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use core_kernel::{ClaimId, PortError};

use crate::access::{authorize, Caller, Operation, Role};
use crate::attachment::{
    sanitize_file_name, AttachmentScope, AttachmentStore, StoredAttachment, Upload,
};
use crate::claim::{ClaimAction, ClaimStatus, ClaimSubmission};
use crate::error::ClaimError;
use crate::lecturer::ClaimWithOwner;
use crate::ports::{ClaimStore, LecturerDirectory};
use crate::validation::{ClaimFields, ClaimValidator};

/// Warning returned when the supporting document could not be stored
pub const UPLOAD_FAILED_WARNING: &str = "File upload failed. Please try again.";

/// Result of a successful submission
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub claim: ClaimSubmission,
    /// Non-fatal problems, such as a failed document upload
    pub warnings: Vec<String>,
}

/// Result of appending files to a claim
#[derive(Debug, Clone, Serialize)]
pub struct AppendOutcome {
    pub claim_id: ClaimId,
    pub stored: Vec<StoredAttachment>,
    /// Names of empty uploads that were not stored
    pub skipped: Vec<String>,
}

/// Claim lifecycle engine
#[derive(Clone)]
pub struct ClaimWorkflow {
    claims: Arc<dyn ClaimStore>,
    directory: Arc<dyn LecturerDirectory>,
    attachments: Arc<dyn AttachmentStore>,
}

impl ClaimWorkflow {
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        directory: Arc<dyn LecturerDirectory>,
        attachments: Arc<dyn AttachmentStore>,
    ) -> Self {
        Self {
            claims,
            directory,
            attachments,
        }
    }

    /// Returns the claim store backing the engine
    pub fn store(&self) -> &Arc<dyn ClaimStore> {
        &self.claims
    }

    /// Submits a new claim on behalf of the calling lecturer
    ///
    /// All field problems are reported together and nothing is stored when
    /// any of them fails. A document that cannot be stored does not block the
    /// claim; it is dropped and reported in [`Submission::warnings`].
    #[instrument(skip(self, fields, document), fields(user = %caller.user_id))]
    pub async fn submit_claim(
        &self,
        caller: &Caller,
        fields: ClaimFields,
        document: Option<Upload>,
    ) -> Result<Submission, ClaimError> {
        authorize(&caller.roles, Operation::SubmitClaim)?;

        let mut result = ClaimValidator::check(&fields);
        if !self.is_registered_lecturer(caller).await? {
            result.add_error("owner", "Lecturer not found.");
        }
        result.into_result()?;
        let fields = ClaimValidator::validate(fields)?;

        let mut warnings = Vec::new();
        let supporting_document = match document {
            Some(upload) if upload.is_empty() => {
                debug!(file = %upload.file_name, "Ignoring empty supporting document");
                None
            }
            Some(upload) => match self.attachments.store(AttachmentScope::Submission, &upload).await {
                Ok(stored) => Some(stored.reference),
                Err(e) => {
                    warn!(error = %e, file = %upload.file_name, "Supporting document upload failed");
                    warnings.push(UPLOAD_FAILED_WARNING.to_string());
                    None
                }
            },
            None => None,
        };

        let claim = ClaimSubmission::submit(caller.user_id, fields, supporting_document);
        self.claims.insert(&claim).await?;

        info!(
            claim_id = %claim.id(),
            final_payment = %claim.final_payment(),
            "Claim submitted"
        );

        Ok(Submission { claim, warnings })
    }

    /// Approves or rejects a pending claim
    ///
    /// Only `Pending` claims can be decided. When two managers decide the same
    /// claim at once, the store lets one win and the other gets
    /// `InvalidStatusTransition` against the winning status.
    #[instrument(skip(self), fields(user = %caller.user_id))]
    pub async fn transition_claim(
        &self,
        caller: &Caller,
        claim_id: ClaimId,
        action: ClaimAction,
    ) -> Result<ClaimSubmission, ClaimError> {
        authorize(&caller.roles, Operation::TransitionClaim)?;

        let mut claim = self
            .claims
            .get(claim_id)
            .await?
            .ok_or(ClaimError::ClaimNotFound(claim_id))?;

        let from = claim.status();
        let to = claim.apply(action)?;

        match self.claims.update_status(claim_id, from, to, caller.user_id).await {
            Ok(updated) => {
                info!(claim_id = %claim_id, from = %from, to = %to, "Claim status changed");
                Ok(updated)
            }
            Err(PortError::Conflict { .. }) => {
                let current = self
                    .claims
                    .get(claim_id)
                    .await?
                    .map(|c| c.status())
                    .unwrap_or(from);
                warn!(claim_id = %claim_id, status = %current, "Lost concurrent status change");
                Err(ClaimError::InvalidStatusTransition { from: current, to })
            }
            Err(e) if e.is_not_found() => Err(ClaimError::ClaimNotFound(claim_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists claims in a status with their owners, oldest submission first
    pub async fn list_claims_by_status(
        &self,
        caller: &Caller,
        status: ClaimStatus,
    ) -> Result<Vec<ClaimWithOwner>, ClaimError> {
        authorize(&caller.roles, Operation::ListClaims(status))?;
        Ok(self.claims.list_by_status(status).await?)
    }

    /// Lists the caller's own pending claims
    pub async fn pending_claims_for(&self, caller: &Caller) -> Result<Vec<ClaimSubmission>, ClaimError> {
        authorize(&caller.roles, Operation::ListOwnPendingClaims)?;
        Ok(self
            .claims
            .list_for_owner(caller.user_id, ClaimStatus::Pending)
            .await?)
    }

    /// Stores additional supporting files for one of the caller's pending claims
    ///
    /// No file is written unless the claim exists, belongs to the caller and
    /// is still pending, and every file name is usable. Empty uploads are
    /// skipped. When a write fails, the files stored before it are recorded
    /// against the claim and the storage error is returned.
    #[instrument(skip(self, files), fields(user = %caller.user_id, files = files.len()))]
    pub async fn append_supporting_files(
        &self,
        caller: &Caller,
        claim_id: ClaimId,
        files: Vec<Upload>,
    ) -> Result<AppendOutcome, ClaimError> {
        authorize(&caller.roles, Operation::AppendSupportingFiles)?;

        let claim = self
            .claims
            .get(claim_id)
            .await?
            .ok_or(ClaimError::ClaimNotFound(claim_id))?;

        if !claim.is_owned_by(caller.user_id) {
            return Err(ClaimError::Forbidden(format!(
                "claim {} belongs to another lecturer",
                claim_id
            )));
        }
        if claim.status() != ClaimStatus::Pending {
            return Err(ClaimError::ClaimClosed {
                id: claim_id,
                status: claim.status(),
            });
        }

        let (uploads, skipped): (Vec<&Upload>, Vec<&Upload>) =
            files.iter().partition(|upload| !upload.is_empty());
        let skipped: Vec<String> = skipped.into_iter().map(|u| u.file_name.clone()).collect();

        for upload in &uploads {
            sanitize_file_name(&upload.file_name)?;
        }

        let mut stored = Vec::with_capacity(uploads.len());
        let scope = AttachmentScope::Claim(claim_id);

        for upload in uploads {
            match self.attachments.store(scope, upload).await {
                Ok(attachment) => stored.push(attachment),
                Err(e) => {
                    warn!(
                        claim_id = %claim_id,
                        file = %upload.file_name,
                        recorded = stored.len(),
                        error = %e,
                        "Supporting file upload failed"
                    );
                    // Files already written stay referenced by the claim
                    if !stored.is_empty() {
                        self.claims.record_attachments(claim_id, &stored).await?;
                    }
                    return Err(e.into());
                }
            }
        }

        if !stored.is_empty() {
            self.claims.record_attachments(claim_id, &stored).await?;
        }

        info!(
            claim_id = %claim_id,
            stored = stored.len(),
            skipped = skipped.len(),
            "Supporting files appended"
        );

        Ok(AppendOutcome {
            claim_id,
            stored,
            skipped,
        })
    }

    async fn is_registered_lecturer(&self, caller: &Caller) -> Result<bool, ClaimError> {
        if self.directory.find_profile(caller.user_id).await?.is_none() {
            return Ok(false);
        }
        Ok(self.directory.roles_of(caller.user_id).await?.contains(Role::Lecturer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lecturer::LecturerProfile;
    use crate::ports::mock::{MockAttachmentStore, MockClaimStore, MockLecturerDirectory};
    use core_kernel::UserId;
    use rust_decimal_macros::dec;

    struct Harness {
        workflow: ClaimWorkflow,
        store: MockClaimStore,
        files: MockAttachmentStore,
        lecturer: Caller,
        manager: Caller,
    }

    async fn harness() -> Harness {
        let directory = MockLecturerDirectory::new();
        let lecturer_id = UserId::new();
        directory
            .add_user(
                LecturerProfile {
                    id: lecturer_id,
                    full_name: "Ada Lovelace".to_string(),
                    email: "ada@example.com".to_string(),
                    department: "Mathematics".to_string(),
                },
                Role::Lecturer.into(),
            )
            .await;

        let store = MockClaimStore::new(directory.clone());
        let files = MockAttachmentStore::new();
        let workflow = ClaimWorkflow::new(
            Arc::new(store.clone()),
            Arc::new(directory),
            Arc::new(files.clone()),
        );

        Harness {
            workflow,
            store,
            files,
            lecturer: Caller::new(lecturer_id, Role::Lecturer),
            manager: Caller::new(UserId::new(), Role::AcademicManager),
        }
    }

    fn fields() -> ClaimFields {
        ClaimFields {
            hours_worked: Some(dec!(10)),
            hourly_rate: Some(dec!(20)),
            additional_notes: None,
        }
    }

    #[tokio::test]
    async fn test_submit_stores_document_reference() {
        let h = harness().await;
        let submission = h
            .workflow
            .submit_claim(&h.lecturer, fields(), Some(Upload::new("hours.pdf", b"%PDF".to_vec())))
            .await
            .unwrap();

        assert!(submission.warnings.is_empty());
        assert_eq!(
            submission.claim.supporting_document().map(|r| r.as_str()),
            Some("/uploads/hours.pdf")
        );
        assert_eq!(h.files.file_count().await, 1);
    }

    #[tokio::test]
    async fn test_submit_survives_upload_failure() {
        let h = harness().await;
        h.files.fail_writes(true);

        let submission = h
            .workflow
            .submit_claim(&h.lecturer, fields(), Some(Upload::new("hours.pdf", b"%PDF".to_vec())))
            .await
            .unwrap();

        assert_eq!(submission.warnings, vec![UPLOAD_FAILED_WARNING.to_string()]);
        assert!(submission.claim.supporting_document().is_none());
        assert_eq!(h.store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_submit_ignores_empty_upload() {
        let h = harness().await;
        let submission = h
            .workflow
            .submit_claim(&h.lecturer, fields(), Some(Upload::new("empty.pdf", Vec::new())))
            .await
            .unwrap();

        assert!(submission.claim.supporting_document().is_none());
        assert_eq!(h.files.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_submission_writes_nothing() {
        let h = harness().await;
        let err = h
            .workflow
            .submit_claim(
                &h.lecturer,
                ClaimFields::default(),
                Some(Upload::new("hours.pdf", b"%PDF".to_vec())),
            )
            .await
            .unwrap_err();

        assert_eq!(err.field_errors().len(), 2);
        assert_eq!(h.store.count().await.unwrap(), 0);
        assert_eq!(h.files.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_lecturer_is_a_field_error() {
        let h = harness().await;
        let stranger = Caller::new(UserId::new(), Role::Lecturer);

        let err = h.workflow.submit_claim(&stranger, fields(), None).await.unwrap_err();
        assert_eq!(err.field_errors()[0].field, "owner");
    }

    #[tokio::test]
    async fn test_transition_requires_manager() {
        let h = harness().await;
        let claim = h.workflow.submit_claim(&h.lecturer, fields(), None).await.unwrap().claim;

        let err = h
            .workflow
            .transition_claim(&h.lecturer, claim.id(), ClaimAction::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_transition_unknown_claim() {
        let h = harness().await;
        let err = h
            .workflow
            .transition_claim(&h.manager, ClaimId::new_v7(), ClaimAction::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::ClaimNotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_decisions_have_one_winner() {
        let h = harness().await;
        let claim = h.workflow.submit_claim(&h.lecturer, fields(), None).await.unwrap().claim;

        let (a, b) = tokio::join!(
            h.workflow.transition_claim(&h.manager, claim.id(), ClaimAction::Approve),
            h.workflow.transition_claim(&h.manager, claim.id(), ClaimAction::Reject),
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let loser = if a.is_ok() { b.unwrap_err() } else { a.unwrap_err() };
        assert!(matches!(loser, ClaimError::InvalidStatusTransition { .. }));
    }

    #[tokio::test]
    async fn test_append_to_closed_claim_is_refused() {
        let h = harness().await;
        let claim = h.workflow.submit_claim(&h.lecturer, fields(), None).await.unwrap().claim;
        h.workflow
            .transition_claim(&h.manager, claim.id(), ClaimAction::Reject)
            .await
            .unwrap();

        let err = h
            .workflow
            .append_supporting_files(&h.lecturer, claim.id(), vec![Upload::new("a.txt", b"a".to_vec())])
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::ClaimClosed { status: ClaimStatus::Rejected, .. }));
        assert_eq!(h.files.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_append_skips_empty_files() {
        let h = harness().await;
        let claim = h.workflow.submit_claim(&h.lecturer, fields(), None).await.unwrap().claim;

        let outcome = h
            .workflow
            .append_supporting_files(
                &h.lecturer,
                claim.id(),
                vec![Upload::new("a.txt", b"a".to_vec()), Upload::new("b.txt", Vec::new())],
            )
            .await
            .unwrap();

        assert_eq!(outcome.stored.len(), 1);
        assert_eq!(outcome.skipped, vec!["b.txt".to_string()]);
        assert_eq!(h.store.attachments_for(claim.id()).await.len(), 1);

        let unchanged = h.store.get(claim.id()).await.unwrap().unwrap();
        assert_eq!(unchanged.status(), ClaimStatus::Pending);
    }

    #[tokio::test]
    async fn test_pending_claims_for_owner_only() {
        let h = harness().await;
        h.workflow.submit_claim(&h.lecturer, fields(), None).await.unwrap();

        let mine = h.workflow.pending_claims_for(&h.lecturer).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(h.workflow.pending_claims_for(&h.manager).await.is_err());
    }
}
