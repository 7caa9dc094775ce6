//! PostgreSQL Claim Store Adapter
//!
//! Implements the `ClaimStore` port on top of [`ClaimsRepository`], turning
//! rows back into domain aggregates and database errors into port errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresClaimStore;
//! use domain_claims::ClaimStore;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn ClaimStore> = Arc::new(PostgresClaimStore::new(pool));
//! let pending = store.list_by_status(ClaimStatus::Pending).await?;
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId,
};
use domain_claims::{
    AttachmentRef, ClaimStatus, ClaimStore, ClaimSubmission, ClaimWithOwner, LecturerProfile,
    StoredAttachment,
};

use crate::repositories::claims::{
    ClaimRow, ClaimStatus as DbClaimStatus, ClaimWithOwnerRow, ClaimsRepository, NewAttachment,
};

const ADAPTER_ID: &str = "postgres-claim-store";

/// PostgreSQL-backed implementation of the ClaimStore port
///
/// # Error Handling
///
/// - unknown claim -> `PortError::NotFound`
/// - status no longer as expected -> `PortError::Conflict`
/// - other database errors -> `PortError::Internal` or `PortError::Connection`
#[derive(Debug, Clone)]
pub struct PostgresClaimStore {
    repository: ClaimsRepository,
    pool: PgPool,
}

impl PostgresClaimStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    ///
    /// Attachment and history queries are only available here.
    pub fn repository(&self) -> &ClaimsRepository {
        &self.repository
    }
}

impl DomainPort for PostgresClaimStore {}

#[async_trait]
impl HealthCheckable for PostgresClaimStore {
    /// Checks database connectivity with `SELECT 1`
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl ClaimStore for PostgresClaimStore {
    #[instrument(skip(self, claim), fields(claim_id = %claim.id()))]
    async fn insert(&self, claim: &ClaimSubmission) -> Result<(), PortError> {
        debug!("Inserting claim");
        self.repository.insert(&claim_to_row(claim)).await?;
        Ok(())
    }

    async fn get(&self, id: ClaimId) -> Result<Option<ClaimSubmission>, PortError> {
        let row = self.repository.find_by_id(*id.as_uuid()).await?;
        Ok(row.map(row_to_claim))
    }

    async fn get_with_owner(&self, id: ClaimId) -> Result<Option<ClaimWithOwner>, PortError> {
        let row = self.repository.find_with_owner(*id.as_uuid()).await?;
        Ok(row.map(row_to_claim_with_owner))
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn update_status(
        &self,
        id: ClaimId,
        from: ClaimStatus,
        to: ClaimStatus,
        changed_by: UserId,
    ) -> Result<ClaimSubmission, PortError> {
        let row = self
            .repository
            .update_status(
                *id.as_uuid(),
                status_to_db(from),
                status_to_db(to),
                *changed_by.as_uuid(),
            )
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    PortError::not_found("Claim", id)
                } else {
                    e.into()
                }
            })?;
        Ok(row_to_claim(row))
    }

    async fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<ClaimWithOwner>, PortError> {
        let rows = self.repository.list_by_status(status_to_db(status)).await?;
        Ok(rows.into_iter().map(row_to_claim_with_owner).collect())
    }

    async fn list_for_owner(
        &self,
        owner_id: UserId,
        status: ClaimStatus,
    ) -> Result<Vec<ClaimSubmission>, PortError> {
        let rows = self
            .repository
            .list_for_owner(*owner_id.as_uuid(), status_to_db(status))
            .await?;
        Ok(rows.into_iter().map(row_to_claim).collect())
    }

    #[instrument(skip(self, attachments), fields(claim_id = %id, count = attachments.len()))]
    async fn record_attachments(
        &self,
        id: ClaimId,
        attachments: &[StoredAttachment],
    ) -> Result<(), PortError> {
        let rows: Vec<NewAttachment> = attachments
            .iter()
            .map(|a| NewAttachment {
                reference: a.reference.as_str().to_string(),
                file_name: a.file_name.clone(),
                size_bytes: i64::try_from(a.size).unwrap_or(i64::MAX),
            })
            .collect();
        self.repository.add_attachments(*id.as_uuid(), &rows).await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64, PortError> {
        let count = self.repository.count().await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

fn status_to_db(status: ClaimStatus) -> DbClaimStatus {
    match status {
        ClaimStatus::Pending => DbClaimStatus::Pending,
        ClaimStatus::Approved => DbClaimStatus::Approved,
        ClaimStatus::Rejected => DbClaimStatus::Rejected,
    }
}

fn status_from_db(status: DbClaimStatus) -> ClaimStatus {
    match status {
        DbClaimStatus::Pending => ClaimStatus::Pending,
        DbClaimStatus::Approved => ClaimStatus::Approved,
        DbClaimStatus::Rejected => ClaimStatus::Rejected,
    }
}

fn claim_to_row(claim: &ClaimSubmission) -> ClaimRow {
    ClaimRow {
        claim_id: *claim.id().as_uuid(),
        owner_id: *claim.owner_id().as_uuid(),
        hours_worked: claim.hours_worked(),
        hourly_rate: claim.hourly_rate(),
        additional_notes: claim.additional_notes().map(str::to_string),
        submitted_at: claim.submitted_at(),
        status: status_to_db(claim.status()),
        supporting_document: claim.supporting_document().map(|r| r.as_str().to_string()),
        updated_at: claim.submitted_at(),
    }
}

fn row_to_claim(row: ClaimRow) -> ClaimSubmission {
    ClaimSubmission::restore(
        ClaimId::from_uuid(row.claim_id),
        UserId::from_uuid(row.owner_id),
        row.hours_worked,
        row.hourly_rate,
        row.additional_notes,
        row.submitted_at,
        status_from_db(row.status),
        row.supporting_document.map(AttachmentRef::new),
    )
}

fn row_to_claim_with_owner(row: ClaimWithOwnerRow) -> ClaimWithOwner {
    let owner = LecturerProfile {
        id: UserId::from_uuid(row.claim.owner_id),
        full_name: row.owner_full_name,
        email: row.owner_email,
        department: row.owner_department,
    };
    ClaimWithOwner {
        claim: row_to_claim(row.claim),
        owner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::ValidClaimFields;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_conversion_keeps_claim_intact() {
        let claim = ClaimSubmission::submit(
            UserId::new(),
            ValidClaimFields {
                hours_worked: dec!(12.5),
                hourly_rate: dec!(350),
                additional_notes: Some("Exam marking".to_string()),
            },
            Some(AttachmentRef::new("/uploads/marking.pdf")),
        );

        let restored = row_to_claim(claim_to_row(&claim));
        assert_eq!(restored, claim);
    }

    #[test]
    fn test_status_mapping_is_bijective() {
        for status in ClaimStatus::ALL {
            assert_eq!(status_from_db(status_to_db(status)), status);
        }
    }

    #[test]
    fn test_owner_join_builds_profile() {
        let owner_id = uuid::Uuid::new_v4();
        let now = Utc::now();
        let row = ClaimWithOwnerRow {
            claim: ClaimRow {
                claim_id: uuid::Uuid::now_v7(),
                owner_id,
                hours_worked: dec!(10),
                hourly_rate: dec!(20),
                additional_notes: None,
                submitted_at: now,
                status: DbClaimStatus::Approved,
                supporting_document: None,
                updated_at: now,
            },
            owner_full_name: "Ada Lovelace".to_string(),
            owner_email: "ada@example.com".to_string(),
            owner_department: "Mathematics".to_string(),
        };

        let entry = row_to_claim_with_owner(row);
        assert_eq!(entry.owner.id, UserId::from_uuid(owner_id));
        assert_eq!(entry.claim.status(), ClaimStatus::Approved);
        assert_eq!(entry.final_payment(), dec!(200));
    }
}
