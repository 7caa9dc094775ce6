//! Users and roles repository implementation
//!
//! Identity itself is managed by the identity provider; this repository reads
//! the mirrored user records and role memberships, and lets HR correct the
//! profile fields.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for user records, role memberships and the role catalogue
#[derive(Debug, Clone)]
pub struct UsersRepository {
    pool: PgPool,
}

impl UsersRepository {
    /// Creates a new UsersRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a user by identifier
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserRow>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, full_name, email, department, created_at, updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Returns the names of the roles a user holds
    pub async fn role_names(&self, user_id: Uuid) -> Result<Vec<String>, DatabaseError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT role_name FROM user_roles WHERE user_id = $1 ORDER BY role_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Lists users holding a role, ordered by name
    pub async fn list_with_role(&self, role_name: &str) -> Result<Vec<UserRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.user_id, u.full_name, u.email, u.department, u.created_at, u.updated_at
            FROM users u
            JOIN user_roles r ON r.user_id = u.user_id
            WHERE r.role_name = $1
            ORDER BY u.full_name ASC, u.user_id ASC
            "#,
        )
        .bind(role_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Updates a user's name and email
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user, `DuplicateEntry` when another user
    /// already has the email
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<UserRow, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET full_name = $2, email = $3, updated_at = $4
            WHERE user_id = $1
            RETURNING user_id, full_name, email, department, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(email)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            DatabaseError::DuplicateEntry(_) => DatabaseError::duplicate("User", "email", email),
            other => other,
        })?
        .ok_or_else(|| DatabaseError::not_found("User", user_id))?;

        Ok(row)
    }

    /// Inserts a user record
    pub async fn create_user(&self, user: &NewUser) -> Result<UserRow, DatabaseError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (user_id, full_name, email, department, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING user_id, full_name, email, department, created_at, updated_at
            "#,
        )
        .bind(user.user_id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.department)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Grants a role to a user; granting it twice is a no-op
    pub async fn grant_role(&self, user_id: Uuid, role_name: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_name)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Checks whether a role exists in the catalogue
    pub async fn role_exists(&self, role_name: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM roles WHERE name = $1)",
        )
        .bind(role_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Creates a role unless it exists; returns true if a row was inserted
    pub async fn create_role_if_absent(&self, role_name: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            INSERT INTO roles (name, created_at)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(role_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

/// Database row for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub department: String,
}
