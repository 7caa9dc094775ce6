//! Role-based access control
//!
//! Every operation declares the roles allowed to invoke it as data
//! ([`Operation::required_roles`]); a single [`authorize`] function turns a
//! caller's role set into allow or deny. The role catalogue is seeded once at
//! startup through [`seed_roles`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{PortError, UserId};

use crate::claim::ClaimStatus;
use crate::error::ClaimError;
use crate::ports::RoleRegistry;

/// Role tags gating which operations a caller may invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Lecturer,
    AcademicManager,
    #[serde(rename = "HR")]
    Hr,
}

impl Role {
    /// Every role known to the system, in seeding order
    pub const ALL: [Role; 3] = [Role::Lecturer, Role::AcademicManager, Role::Hr];

    /// Returns the wire name used by the identity provider
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Lecturer => "Lecturer",
            Role::AcademicManager => "AcademicManager",
            Role::Hr => "HR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown role: {}", s))
    }
}

/// The set of roles a caller holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// Creates an empty role set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a role set from identity-provider role names, ignoring unknown names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| match name.as_ref().parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    debug!(error = %e, "Ignoring role");
                    None
                }
            })
            .collect()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// Returns true if any of the given roles is held
    pub fn contains_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.contains(*role))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        Self(BTreeSet::from([role]))
    }
}

/// An authenticated caller as established by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub roles: RoleSet,
}

impl Caller {
    pub fn new(user_id: UserId, roles: impl Into<RoleSet>) -> Self {
        Self {
            user_id,
            roles: roles.into(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }
}

/// Operations exposed by the workflow and the HR desk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SubmitClaim,
    TransitionClaim,
    ListClaims(ClaimStatus),
    AppendSupportingFiles,
    ListOwnPendingClaims,
    ListLecturers,
    EditLecturer,
    GenerateReport,
}

impl Operation {
    /// Roles allowed to invoke the operation
    ///
    /// HR only ever sees approved claims; the other status queues belong to
    /// academic managers.
    pub fn required_roles(&self) -> &'static [Role] {
        match self {
            Operation::SubmitClaim
            | Operation::AppendSupportingFiles
            | Operation::ListOwnPendingClaims => &[Role::Lecturer],
            Operation::TransitionClaim => &[Role::AcademicManager],
            Operation::ListClaims(ClaimStatus::Approved) => &[Role::AcademicManager, Role::Hr],
            Operation::ListClaims(_) => &[Role::AcademicManager],
            Operation::ListLecturers | Operation::EditLecturer | Operation::GenerateReport => {
                &[Role::Hr]
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Operation::SubmitClaim => "submit claims".to_string(),
            Operation::TransitionClaim => "approve or reject claims".to_string(),
            Operation::ListClaims(status) => format!("list {} claims", status.as_str().to_lowercase()),
            Operation::AppendSupportingFiles => "upload supporting documents".to_string(),
            Operation::ListOwnPendingClaims => "list own pending claims".to_string(),
            Operation::ListLecturers => "list lecturers".to_string(),
            Operation::EditLecturer => "edit lecturer records".to_string(),
            Operation::GenerateReport => "generate claim reports".to_string(),
        }
    }
}

/// Checks that the role set allows the operation
pub fn authorize(roles: &RoleSet, operation: Operation) -> Result<(), ClaimError> {
    let required = operation.required_roles();
    if roles.contains_any(required) {
        return Ok(());
    }

    let names: Vec<&str> = required.iter().map(Role::as_str).collect();
    Err(ClaimError::Forbidden(format!(
        "{} requires role {}",
        operation.describe(),
        names.join(" or ")
    )))
}

/// Ensures every role exists in the registry, creating the missing ones
///
/// Safe to call from several instances starting at once: the registry's
/// create-if-absent never inserts a role twice.
///
/// # Returns
///
/// The roles that were created by this call
pub async fn seed_roles(registry: &dyn RoleRegistry) -> Result<Vec<Role>, PortError> {
    let mut created = Vec::new();

    for role in Role::ALL {
        if registry.role_exists(role).await? {
            continue;
        }
        if registry.create_role_if_absent(role).await? {
            info!(role = %role, "Created role");
            created.push(role);
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_accepts_wire_names() {
        assert_eq!("Lecturer".parse::<Role>().unwrap(), Role::Lecturer);
        assert_eq!("AcademicManager".parse::<Role>().unwrap(), Role::AcademicManager);
        assert_eq!("HR".parse::<Role>().unwrap(), Role::Hr);
        assert_eq!("hr".parse::<Role>().unwrap(), Role::Hr);
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_to_wire_name() {
        assert_eq!(serde_json::to_string(&Role::Hr).unwrap(), "\"HR\"");
        assert_eq!(
            serde_json::to_string(&Role::AcademicManager).unwrap(),
            "\"AcademicManager\""
        );
    }

    #[test]
    fn test_role_set_ignores_unknown_names() {
        let roles = RoleSet::from_names(["Lecturer", "Janitor", "HR"]);
        assert!(roles.contains(Role::Lecturer));
        assert!(roles.contains(Role::Hr));
        assert!(!roles.contains(Role::AcademicManager));
        assert_eq!(roles.iter().count(), 2);
    }

    #[test]
    fn test_authorize_submit_requires_lecturer() {
        assert!(authorize(&Role::Lecturer.into(), Operation::SubmitClaim).is_ok());

        let err = authorize(&Role::AcademicManager.into(), Operation::SubmitClaim).unwrap_err();
        assert!(matches!(err, ClaimError::Forbidden(_)));
        assert!(err.to_string().contains("Lecturer"));
    }

    #[test]
    fn test_authorize_transition_requires_manager() {
        assert!(authorize(&Role::AcademicManager.into(), Operation::TransitionClaim).is_ok());
        assert!(authorize(&Role::Lecturer.into(), Operation::TransitionClaim).is_err());
        assert!(authorize(&Role::Hr.into(), Operation::TransitionClaim).is_err());
    }

    #[test]
    fn test_hr_may_only_list_approved_claims() {
        let hr: RoleSet = Role::Hr.into();
        assert!(authorize(&hr, Operation::ListClaims(ClaimStatus::Approved)).is_ok());
        assert!(authorize(&hr, Operation::ListClaims(ClaimStatus::Pending)).is_err());
        assert!(authorize(&hr, Operation::ListClaims(ClaimStatus::Rejected)).is_err());
    }

    #[test]
    fn test_manager_may_list_every_status() {
        let manager: RoleSet = Role::AcademicManager.into();
        for status in ClaimStatus::ALL {
            assert!(authorize(&manager, Operation::ListClaims(status)).is_ok());
        }
    }

    #[test]
    fn test_empty_role_set_is_denied_everything() {
        let none = RoleSet::new();
        assert!(authorize(&none, Operation::SubmitClaim).is_err());
        assert!(authorize(&none, Operation::GenerateReport).is_err());
    }

    #[test]
    fn test_multiple_roles_union() {
        let roles: RoleSet = [Role::Lecturer, Role::Hr].into_iter().collect();
        assert!(authorize(&roles, Operation::SubmitClaim).is_ok());
        assert!(authorize(&roles, Operation::EditLecturer).is_ok());
        assert!(authorize(&roles, Operation::TransitionClaim).is_err());
    }
}
