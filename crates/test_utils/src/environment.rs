//! In-memory Test Environment
//!
//! Wires a [`ClaimWorkflow`] and an [`HrDesk`] to the mock adapters from
//! `domain_claims` and keeps handles on the adapters so tests can inspect
//! what was written.

use std::sync::Arc;

use domain_claims::ports::mock::{
    MockAttachmentStore, MockClaimStore, MockLecturerDirectory, MockRoleRegistry,
};
use domain_claims::{
    Caller, ClaimSubmission, ClaimWorkflow, HrDesk, HtmlReportRenderer, LecturerProfile, Role,
    RoleSet,
};

use crate::fixtures::{CallerFixtures, ProfileFixtures};

/// Organisation name printed on reports rendered in tests
pub const TEST_ORGANISATION: &str = "Test University";

/// Workflow, HR desk and the adapters behind them
#[derive(Clone)]
pub struct TestEnvironment {
    pub directory: MockLecturerDirectory,
    pub claims: MockClaimStore,
    pub attachments: MockAttachmentStore,
    pub roles: MockRoleRegistry,
    pub workflow: ClaimWorkflow,
    pub hr: HrDesk,
}

impl TestEnvironment {
    /// Creates an empty environment with no users
    pub fn new() -> Self {
        let directory = MockLecturerDirectory::new();
        let claims = MockClaimStore::new(directory.clone());
        let attachments = MockAttachmentStore::new();
        // The bundled template is compiled in; failing to parse it is a build defect.
        let renderer = HtmlReportRenderer::new(TEST_ORGANISATION)
            .unwrap_or_else(|e| panic!("report template must parse: {}", e));

        let workflow = ClaimWorkflow::new(
            Arc::new(claims.clone()),
            Arc::new(directory.clone()),
            Arc::new(attachments.clone()),
        );
        let hr = HrDesk::new(
            Arc::new(claims.clone()),
            Arc::new(directory.clone()),
            Arc::new(renderer),
        );

        Self {
            directory,
            claims,
            attachments,
            roles: MockRoleRegistry::new(),
            workflow,
            hr,
        }
    }

    /// Creates an environment with the four fixture users registered
    pub async fn with_fixture_users() -> Self {
        let env = Self::new();
        env.register(ProfileFixtures::lecturer(), Role::Lecturer).await;
        env.register(ProfileFixtures::other_lecturer(), Role::Lecturer).await;
        env.register(ProfileFixtures::manager(), Role::AcademicManager).await;
        env.register(ProfileFixtures::hr(), Role::Hr).await;
        env
    }

    /// Registers a user and returns the matching caller
    pub async fn register(&self, profile: LecturerProfile, roles: impl Into<RoleSet>) -> Caller {
        let roles = roles.into();
        let caller = Caller::new(profile.id, roles.clone());
        self.directory.add_user(profile, roles).await;
        caller
    }

    /// Puts a claim straight into the store, bypassing the workflow
    pub async fn seed_claim(&self, claim: ClaimSubmission) -> ClaimSubmission {
        use domain_claims::ClaimStore;

        if let Err(e) = self.claims.insert(&claim).await {
            panic!("seeding claim {} failed: {}", claim.id(), e);
        }
        claim
    }

    pub fn lecturer(&self) -> Caller {
        CallerFixtures::lecturer()
    }

    pub fn other_lecturer(&self) -> Caller {
        CallerFixtures::other_lecturer()
    }

    pub fn manager(&self) -> Caller {
        CallerFixtures::manager()
    }

    pub fn hr_caller(&self) -> Caller {
        CallerFixtures::hr()
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
