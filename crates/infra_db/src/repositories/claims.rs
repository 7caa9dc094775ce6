//! Claims repository implementation
//!
//! This module provides database access for lecturer claims: submission,
//! status changes with history, attachment records and the status queues.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use core_kernel::AttachmentId;

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = r#"
    c.claim_id, c.owner_id, c.hours_worked, c.hourly_rate, c.additional_notes,
    c.submitted_at, c.status, c.supporting_document, c.updated_at
"#;

const OWNER_COLUMNS: &str = r#"
    u.full_name AS owner_full_name, u.email AS owner_email, u.department AS owner_department
"#;

/// Repository for managing claims data
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    /// Creates a new ClaimsRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a claim by its identifier
    pub async fn find_by_id(&self, claim_id: Uuid) -> Result<Option<ClaimRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM claims c WHERE c.claim_id = $1", CLAIM_COLUMNS);
        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Retrieves a claim joined with its owner's profile
    pub async fn find_with_owner(
        &self,
        claim_id: Uuid,
    ) -> Result<Option<ClaimWithOwnerRow>, DatabaseError> {
        let sql = format!(
            "SELECT {}, {} FROM claims c JOIN users u ON u.user_id = c.owner_id WHERE c.claim_id = $1",
            CLAIM_COLUMNS, OWNER_COLUMNS
        );
        let row = sqlx::query_as::<_, ClaimWithOwnerRow>(&sql)
            .bind(claim_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Inserts a newly submitted claim
    pub async fn insert(&self, claim: &ClaimRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO claims (
                claim_id, owner_id, hours_worked, hourly_rate, additional_notes,
                submitted_at, status, supporting_document, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(claim.claim_id)
        .bind(claim.owner_id)
        .bind(claim.hours_worked)
        .bind(claim.hourly_rate)
        .bind(&claim.additional_notes)
        .bind(claim.submitted_at)
        .bind(claim.status)
        .bind(&claim.supporting_document)
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Moves a claim from `from` to `to` and records the change
    ///
    /// The update only matches while the claim is still in `from`, so of two
    /// concurrent changes exactly one commits.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown claim, `StaleState` when the claim is no
    /// longer in `from`
    pub async fn update_status(
        &self,
        claim_id: Uuid,
        from: ClaimStatus,
        to: ClaimStatus,
        changed_by: Uuid,
    ) -> Result<ClaimRow, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let sql = format!(
            r#"
            UPDATE claims c
            SET status = $3, updated_at = $4
            WHERE c.claim_id = $1 AND c.status = $2
            RETURNING {}
            "#,
            CLAIM_COLUMNS
        );
        let updated = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim_id)
            .bind(from)
            .bind(to)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(claim) = updated else {
            let current = sqlx::query_scalar::<_, ClaimStatus>("SELECT status FROM claims WHERE claim_id = $1")
                .bind(claim_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match current {
                None => DatabaseError::not_found("Claim", claim_id),
                Some(status) => DatabaseError::StaleState(format!(
                    "claim {} is {:?}, expected {:?}",
                    claim_id, status, from
                )),
            });
        };

        // Record status history
        sqlx::query(
            r#"
            INSERT INTO claim_status_history (
                history_id, claim_id, from_status, to_status, changed_by, changed_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(claim_id)
        .bind(from)
        .bind(to)
        .bind(changed_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(%claim_id, ?from, ?to, "Claim status updated");
        Ok(claim)
    }

    /// Lists claims in a status with their owners, oldest submission first
    pub async fn list_by_status(
        &self,
        status: ClaimStatus,
    ) -> Result<Vec<ClaimWithOwnerRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}, {}
            FROM claims c
            JOIN users u ON u.user_id = c.owner_id
            WHERE c.status = $1
            ORDER BY c.submitted_at ASC, c.claim_id ASC
            "#,
            CLAIM_COLUMNS, OWNER_COLUMNS
        );
        let rows = sqlx::query_as::<_, ClaimWithOwnerRow>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Lists a lecturer's claims in a status, oldest submission first
    pub async fn list_for_owner(
        &self,
        owner_id: Uuid,
        status: ClaimStatus,
    ) -> Result<Vec<ClaimRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM claims c
            WHERE c.owner_id = $1 AND c.status = $2
            ORDER BY c.submitted_at ASC, c.claim_id ASC
            "#,
            CLAIM_COLUMNS
        );
        let rows = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(owner_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Records files appended to a claim in one transaction
    pub async fn add_attachments(
        &self,
        claim_id: Uuid,
        attachments: &[NewAttachment],
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for attachment in attachments {
            sqlx::query(
                r#"
                INSERT INTO claim_attachments (
                    attachment_id, claim_id, reference, file_name, size_bytes, uploaded_at
                ) VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(*AttachmentId::new_v7().as_uuid())
            .bind(claim_id)
            .bind(&attachment.reference)
            .bind(&attachment.file_name)
            .bind(attachment.size_bytes)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Lists attachments recorded for a claim in upload order
    pub async fn attachments_for(&self, claim_id: Uuid) -> Result<Vec<AttachmentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AttachmentRow>(
            r#"
            SELECT attachment_id, claim_id, reference, file_name, size_bytes, uploaded_at
            FROM claim_attachments
            WHERE claim_id = $1
            ORDER BY uploaded_at ASC, attachment_id ASC
            "#,
        )
        .bind(claim_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Lists the recorded status changes of a claim, oldest first
    pub async fn status_history(&self, claim_id: Uuid) -> Result<Vec<StatusHistoryRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, StatusHistoryRow>(
            r#"
            SELECT history_id, claim_id, from_status, to_status, changed_by, changed_at
            FROM claim_status_history
            WHERE claim_id = $1
            ORDER BY changed_at ASC, history_id ASC
            "#,
        )
        .bind(claim_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Counts all claims
    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM claims")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Claim status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "claim_status", rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

/// Database row for claim
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub claim_id: Uuid,
    pub owner_id: Uuid,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub additional_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub status: ClaimStatus,
    pub supporting_document: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for a claim joined with its owner
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimWithOwnerRow {
    #[sqlx(flatten)]
    pub claim: ClaimRow,
    pub owner_full_name: String,
    pub owner_email: String,
    pub owner_department: String,
}

/// Data for recording an appended file
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub reference: String,
    pub file_name: String,
    pub size_bytes: i64,
}

/// Database row for an appended file
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttachmentRow {
    pub attachment_id: Uuid,
    pub claim_id: Uuid,
    pub reference: String,
    pub file_name: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Database row for a status change
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusHistoryRow {
    pub history_id: Uuid,
    pub claim_id: Uuid,
    pub from_status: ClaimStatus,
    pub to_status: ClaimStatus,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
}
