//! Pre-built Test Fixtures
//!
//! Ready-to-use users and callers for the three roles. Fixtures are
//! predictable so unit tests can compare against literal values.

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use uuid::Uuid;

use core_kernel::UserId;
use domain_claims::{Caller, LecturerProfile, Role, RoleSet};

/// Fixed submission time used by built claims (1 Sep 2024, 09:00 UTC)
pub static SUBMITTED_AT: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).single().unwrap_or_default());

/// Fixture for user profiles
pub struct ProfileFixtures;

impl ProfileFixtures {
    /// Lecturer "Ada Lovelace" in Computing
    pub fn lecturer() -> LecturerProfile {
        LecturerProfile {
            id: IdFixtures::lecturer_id(),
            full_name: "Ada Lovelace".to_string(),
            email: "ada.lovelace@example.edu".to_string(),
            department: "Computing".to_string(),
        }
    }

    /// A second lecturer, used for ownership checks
    pub fn other_lecturer() -> LecturerProfile {
        LecturerProfile {
            id: IdFixtures::other_lecturer_id(),
            full_name: "Charles Babbage".to_string(),
            email: "charles.babbage@example.edu".to_string(),
            department: "Mathematics".to_string(),
        }
    }

    pub fn manager() -> LecturerProfile {
        LecturerProfile {
            id: IdFixtures::manager_id(),
            full_name: "Grace Hopper".to_string(),
            email: "grace.hopper@example.edu".to_string(),
            department: "Computing".to_string(),
        }
    }

    pub fn hr() -> LecturerProfile {
        LecturerProfile {
            id: IdFixtures::hr_id(),
            full_name: "Alan Turing".to_string(),
            email: "alan.turing@example.edu".to_string(),
            department: "Human Resources".to_string(),
        }
    }
}

/// Fixture for stable identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn lecturer_id() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0001))
    }

    pub fn other_lecturer_id() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0002))
    }

    pub fn manager_id() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0003))
    }

    pub fn hr_id() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0004))
    }
}

/// Fixture for authenticated callers
pub struct CallerFixtures;

impl CallerFixtures {
    pub fn lecturer() -> Caller {
        Caller::new(IdFixtures::lecturer_id(), Role::Lecturer)
    }

    pub fn other_lecturer() -> Caller {
        Caller::new(IdFixtures::other_lecturer_id(), Role::Lecturer)
    }

    pub fn manager() -> Caller {
        Caller::new(IdFixtures::manager_id(), Role::AcademicManager)
    }

    pub fn hr() -> Caller {
        Caller::new(IdFixtures::hr_id(), Role::Hr)
    }

    /// A signed-in user holding no role at all
    pub fn nobody() -> Caller {
        Caller::new(UserId::new(), RoleSet::new())
    }
}
