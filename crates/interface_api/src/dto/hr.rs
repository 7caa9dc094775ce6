//! HR DTOs

use serde::{Deserialize, Serialize};

use core_kernel::UserId;
use domain_claims::{LecturerProfile, LecturerUpdate};

#[derive(Debug, Serialize)]
pub struct LecturerResponse {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub department: String,
}

impl From<LecturerProfile> for LecturerResponse {
    fn from(profile: LecturerProfile) -> Self {
        Self {
            id: profile.id,
            full_name: profile.full_name,
            email: profile.email,
            department: profile.department,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateLecturerRequest {
    pub full_name: String,
    pub email: String,
}

impl From<UpdateLecturerRequest> for LecturerUpdate {
    fn from(request: UpdateLecturerRequest) -> Self {
        LecturerUpdate {
            full_name: request.full_name,
            email: request.email,
        }
    }
}
