//! PostgreSQL Lecturer Directory and Role Registry Adapters

use async_trait::async_trait;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, PortError, UserId};
use domain_claims::{LecturerDirectory, LecturerProfile, LecturerUpdate, Role, RoleRegistry, RoleSet};
use sqlx::PgPool;

use crate::repositories::users::{UserRow, UsersRepository};

/// PostgreSQL-backed implementation of the LecturerDirectory port
#[derive(Debug, Clone)]
pub struct PostgresLecturerDirectory {
    repository: UsersRepository,
}

impl PostgresLecturerDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UsersRepository::new(pool),
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &UsersRepository {
        &self.repository
    }
}

impl DomainPort for PostgresLecturerDirectory {}

#[async_trait]
impl LecturerDirectory for PostgresLecturerDirectory {
    async fn find_profile(&self, id: UserId) -> Result<Option<LecturerProfile>, PortError> {
        let row = self.repository.find_by_id(*id.as_uuid()).await?;
        Ok(row.map(row_to_profile))
    }

    async fn roles_of(&self, id: UserId) -> Result<RoleSet, PortError> {
        let names = self.repository.role_names(*id.as_uuid()).await?;
        Ok(RoleSet::from_names(names))
    }

    async fn list_with_role(&self, role: Role) -> Result<Vec<LecturerProfile>, PortError> {
        let rows = self.repository.list_with_role(role.as_str()).await?;
        Ok(rows.into_iter().map(row_to_profile).collect())
    }

    #[instrument(skip(self, update), fields(user = %id))]
    async fn update_profile(
        &self,
        id: UserId,
        update: &LecturerUpdate,
    ) -> Result<LecturerProfile, PortError> {
        debug!("Updating lecturer profile");
        let row = self
            .repository
            .update_profile(*id.as_uuid(), &update.full_name, &update.email)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    PortError::not_found("User", id)
                } else {
                    e.into()
                }
            })?;
        Ok(row_to_profile(row))
    }
}

/// PostgreSQL-backed implementation of the RoleRegistry port
///
/// Role creation uses `ON CONFLICT DO NOTHING`, so instances seeding the
/// catalogue at the same time never insert a role twice.
#[derive(Debug, Clone)]
pub struct PostgresRoleRegistry {
    repository: UsersRepository,
}

impl PostgresRoleRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UsersRepository::new(pool),
        }
    }
}

impl DomainPort for PostgresRoleRegistry {}

#[async_trait]
impl RoleRegistry for PostgresRoleRegistry {
    async fn role_exists(&self, role: Role) -> Result<bool, PortError> {
        Ok(self.repository.role_exists(role.as_str()).await?)
    }

    async fn create_role_if_absent(&self, role: Role) -> Result<bool, PortError> {
        Ok(self.repository.create_role_if_absent(role.as_str()).await?)
    }
}

fn row_to_profile(row: UserRow) -> LecturerProfile {
    LecturerProfile {
        id: UserId::from_uuid(row.user_id),
        full_name: row.full_name,
        email: row.email,
        department: row.department,
    }
}
