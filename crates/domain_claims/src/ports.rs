//! Claims Domain Ports
//!
//! Port interfaces the claim workflow needs from its collaborators. The
//! PostgreSQL adapters live in `infra_db`; the in-memory mocks below back
//! unit tests and the HTTP test suite.
//!
//! - [`ClaimStore`]: durable claim records, queryable by id, status and owner
//! - [`LecturerDirectory`]: profiles and role memberships from the identity provider
//! - [`RoleRegistry`]: the role catalogue seeded at startup

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, HealthCheckable, PortError, UserId};

use crate::access::{Role, RoleSet};
use crate::attachment::StoredAttachment;
use crate::claim::{ClaimStatus, ClaimSubmission};
use crate::lecturer::{ClaimWithOwner, LecturerProfile, LecturerUpdate};

/// Durable persistence for claim records
///
/// Each method is a single atomic operation against the store.
#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    /// Inserts a newly submitted claim
    async fn insert(&self, claim: &ClaimSubmission) -> Result<(), PortError>;

    /// Retrieves a claim by ID
    async fn get(&self, id: ClaimId) -> Result<Option<ClaimSubmission>, PortError>;

    /// Retrieves a claim together with its owner's profile
    async fn get_with_owner(&self, id: ClaimId) -> Result<Option<ClaimWithOwner>, PortError>;

    /// Moves a claim from `from` to `to` if it is still in `from`
    ///
    /// # Returns
    ///
    /// The updated claim, `PortError::NotFound` for an unknown id, or
    /// `PortError::Conflict` when the claim is no longer in `from`
    async fn update_status(
        &self,
        id: ClaimId,
        from: ClaimStatus,
        to: ClaimStatus,
        changed_by: UserId,
    ) -> Result<ClaimSubmission, PortError>;

    /// Lists claims in a status joined with their owners, oldest submission first
    async fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<ClaimWithOwner>, PortError>;

    /// Lists a lecturer's own claims in a status, oldest submission first
    async fn list_for_owner(
        &self,
        owner_id: UserId,
        status: ClaimStatus,
    ) -> Result<Vec<ClaimSubmission>, PortError>;

    /// Records files appended to a claim
    async fn record_attachments(
        &self,
        id: ClaimId,
        attachments: &[StoredAttachment],
    ) -> Result<(), PortError>;

    /// Counts stored claims
    async fn count(&self) -> Result<u64, PortError>;
}

/// Read access to identities plus the HR-editable profile fields
#[async_trait]
pub trait LecturerDirectory: DomainPort {
    /// Retrieves a user's profile
    async fn find_profile(&self, id: UserId) -> Result<Option<LecturerProfile>, PortError>;

    /// Retrieves the roles a user holds
    async fn roles_of(&self, id: UserId) -> Result<RoleSet, PortError>;

    /// Lists every user holding the role, ordered by name
    async fn list_with_role(&self, role: Role) -> Result<Vec<LecturerProfile>, PortError>;

    /// Updates name and email of a user
    ///
    /// # Returns
    ///
    /// The updated profile, `PortError::NotFound`, or `PortError::Conflict`
    /// when the email belongs to another user
    async fn update_profile(
        &self,
        id: UserId,
        update: &LecturerUpdate,
    ) -> Result<LecturerProfile, PortError>;
}

/// The role catalogue
#[async_trait]
pub trait RoleRegistry: DomainPort {
    async fn role_exists(&self, role: Role) -> Result<bool, PortError>;

    /// Creates the role unless it exists; returns true if this call created it
    async fn create_role_if_absent(&self, role: Role) -> Result<bool, PortError>;
}

/// Mock implementations of the claims ports for testing
///
/// These adapters keep everything in memory and are useful for unit testing
/// without database or filesystem dependencies.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use chrono::Utc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    use crate::attachment::{
        sanitize_file_name, AttachmentError, AttachmentRef, AttachmentScope, AttachmentStore,
        Upload,
    };

    /// In-memory claim store
    #[derive(Debug, Default, Clone)]
    pub struct MockClaimStore {
        claims: Arc<RwLock<HashMap<ClaimId, ClaimSubmission>>>,
        attachments: Arc<RwLock<HashMap<ClaimId, Vec<StoredAttachment>>>>,
        directory: MockLecturerDirectory,
    }

    impl MockClaimStore {
        /// Creates a store that joins owners from the given directory
        pub fn new(directory: MockLecturerDirectory) -> Self {
            Self {
                directory,
                ..Default::default()
            }
        }

        /// Attachments recorded for a claim
        pub async fn attachments_for(&self, id: ClaimId) -> Vec<StoredAttachment> {
            self.attachments.read().await.get(&id).cloned().unwrap_or_default()
        }

        async fn with_owner(&self, claim: ClaimSubmission) -> Result<ClaimWithOwner, PortError> {
            let owner = self
                .directory
                .find_profile(claim.owner_id())
                .await?
                .ok_or_else(|| PortError::not_found("User", claim.owner_id()))?;
            Ok(ClaimWithOwner { claim, owner })
        }
    }

    fn oldest_first(claims: &mut [ClaimSubmission]) {
        claims.sort_by(|a, b| {
            a.submitted_at()
                .cmp(&b.submitted_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
    }

    impl DomainPort for MockClaimStore {}

    #[async_trait]
    impl HealthCheckable for MockClaimStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-claim-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ClaimStore for MockClaimStore {
        async fn insert(&self, claim: &ClaimSubmission) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            if claims.contains_key(&claim.id()) {
                return Err(PortError::conflict(format!("Claim {} already exists", claim.id())));
            }
            claims.insert(claim.id(), claim.clone());
            Ok(())
        }

        async fn get(&self, id: ClaimId) -> Result<Option<ClaimSubmission>, PortError> {
            Ok(self.claims.read().await.get(&id).cloned())
        }

        async fn get_with_owner(&self, id: ClaimId) -> Result<Option<ClaimWithOwner>, PortError> {
            match self.get(id).await? {
                Some(claim) => Ok(Some(self.with_owner(claim).await?)),
                None => Ok(None),
            }
        }

        async fn update_status(
            &self,
            id: ClaimId,
            from: ClaimStatus,
            to: ClaimStatus,
            _changed_by: UserId,
        ) -> Result<ClaimSubmission, PortError> {
            let mut claims = self.claims.write().await;
            let claim = claims
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Claim", id))?;

            if claim.status() != from {
                return Err(PortError::conflict(format!(
                    "Claim {} is {}, expected {}",
                    id,
                    claim.status(),
                    from
                )));
            }

            *claim = ClaimSubmission::restore(
                claim.id(),
                claim.owner_id(),
                claim.hours_worked(),
                claim.hourly_rate(),
                claim.additional_notes().map(str::to_string),
                claim.submitted_at(),
                to,
                claim.supporting_document().cloned(),
            );
            Ok(claim.clone())
        }

        async fn list_by_status(
            &self,
            status: ClaimStatus,
        ) -> Result<Vec<ClaimWithOwner>, PortError> {
            let mut matching: Vec<ClaimSubmission> = self
                .claims
                .read()
                .await
                .values()
                .filter(|c| c.status() == status)
                .cloned()
                .collect();
            oldest_first(&mut matching);

            let mut results = Vec::with_capacity(matching.len());
            for claim in matching {
                results.push(self.with_owner(claim).await?);
            }
            Ok(results)
        }

        async fn list_for_owner(
            &self,
            owner_id: UserId,
            status: ClaimStatus,
        ) -> Result<Vec<ClaimSubmission>, PortError> {
            let mut matching: Vec<ClaimSubmission> = self
                .claims
                .read()
                .await
                .values()
                .filter(|c| c.is_owned_by(owner_id) && c.status() == status)
                .cloned()
                .collect();
            oldest_first(&mut matching);
            Ok(matching)
        }

        async fn record_attachments(
            &self,
            id: ClaimId,
            attachments: &[StoredAttachment],
        ) -> Result<(), PortError> {
            if !self.claims.read().await.contains_key(&id) {
                return Err(PortError::not_found("Claim", id));
            }
            self.attachments
                .write()
                .await
                .entry(id)
                .or_default()
                .extend_from_slice(attachments);
            Ok(())
        }

        async fn count(&self) -> Result<u64, PortError> {
            Ok(self.claims.read().await.len() as u64)
        }
    }

    /// In-memory user directory
    #[derive(Debug, Default, Clone)]
    pub struct MockLecturerDirectory {
        users: Arc<RwLock<HashMap<UserId, (LecturerProfile, RoleSet)>>>,
    }

    impl MockLecturerDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a user with the given roles
        pub async fn add_user(&self, profile: LecturerProfile, roles: RoleSet) {
            self.users.write().await.insert(profile.id, (profile, roles));
        }
    }

    impl DomainPort for MockLecturerDirectory {}

    #[async_trait]
    impl LecturerDirectory for MockLecturerDirectory {
        async fn find_profile(&self, id: UserId) -> Result<Option<LecturerProfile>, PortError> {
            Ok(self.users.read().await.get(&id).map(|(p, _)| p.clone()))
        }

        async fn roles_of(&self, id: UserId) -> Result<RoleSet, PortError> {
            Ok(self
                .users
                .read()
                .await
                .get(&id)
                .map(|(_, roles)| roles.clone())
                .unwrap_or_default())
        }

        async fn list_with_role(&self, role: Role) -> Result<Vec<LecturerProfile>, PortError> {
            let mut profiles: Vec<LecturerProfile> = self
                .users
                .read()
                .await
                .values()
                .filter(|(_, roles)| roles.contains(role))
                .map(|(p, _)| p.clone())
                .collect();
            profiles.sort_by(|a, b| a.full_name.cmp(&b.full_name).then_with(|| a.id.cmp(&b.id)));
            Ok(profiles)
        }

        async fn update_profile(
            &self,
            id: UserId,
            update: &LecturerUpdate,
        ) -> Result<LecturerProfile, PortError> {
            let mut users = self.users.write().await;

            let taken = users.values().any(|(p, _)| {
                p.id != id && p.email.eq_ignore_ascii_case(&update.email)
            });
            if taken {
                return Err(PortError::conflict(format!(
                    "Email {} is already in use",
                    update.email
                )));
            }

            let (profile, _) = users
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("User", id))?;
            profile.full_name = update.full_name.clone();
            profile.email = update.email.clone();
            Ok(profile.clone())
        }
    }

    /// In-memory role catalogue
    #[derive(Debug, Default, Clone)]
    pub struct MockRoleRegistry {
        roles: Arc<RwLock<BTreeSet<Role>>>,
    }

    impl MockRoleRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn roles(&self) -> Vec<Role> {
            self.roles.read().await.iter().copied().collect()
        }
    }

    impl DomainPort for MockRoleRegistry {}

    #[async_trait]
    impl RoleRegistry for MockRoleRegistry {
        async fn role_exists(&self, role: Role) -> Result<bool, PortError> {
            Ok(self.roles.read().await.contains(&role))
        }

        async fn create_role_if_absent(&self, role: Role) -> Result<bool, PortError> {
            Ok(self.roles.write().await.insert(role))
        }
    }

    /// In-memory attachment store that can be told to fail
    #[derive(Debug, Default, Clone)]
    pub struct MockAttachmentStore {
        files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
        failing: Arc<AtomicBool>,
        /// Writes allowed before failing; `None` means unlimited
        write_budget: Arc<RwLock<Option<usize>>>,
    }

    impl MockAttachmentStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every following write fail with an I/O error
        pub fn fail_writes(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Lets the next `writes` writes succeed and fails the ones after
        pub async fn fail_after(&self, writes: usize) {
            *self.write_budget.write().await = Some(writes);
        }

        /// Number of stored files
        pub async fn file_count(&self) -> usize {
            self.files.read().await.len()
        }

        /// Content stored under a reference
        pub async fn content(&self, reference: &AttachmentRef) -> Option<Vec<u8>> {
            self.files.read().await.get(reference.as_str()).cloned()
        }
    }

    impl DomainPort for MockAttachmentStore {}

    #[async_trait]
    impl AttachmentStore for MockAttachmentStore {
        async fn store(
            &self,
            scope: AttachmentScope,
            upload: &Upload,
        ) -> Result<StoredAttachment, AttachmentError> {
            let file_name = sanitize_file_name(&upload.file_name)?;
            let reference = match scope.directory() {
                Some(dir) => format!("/uploads/{}/{}", dir, file_name),
                None => format!("/uploads/{}", file_name),
            };

            let mut budget = self.write_budget.write().await;
            if self.failing.load(Ordering::SeqCst) || *budget == Some(0) {
                return Err(AttachmentError::Io {
                    path: reference,
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            if let Some(left) = budget.as_mut() {
                *left -= 1;
            }

            self.files
                .write()
                .await
                .insert(reference.clone(), upload.content.clone());

            Ok(StoredAttachment {
                reference: AttachmentRef::new(reference),
                file_name,
                size: upload.content.len() as u64,
            })
        }
    }
}
