//! HR handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};

use core_kernel::{ClaimId, UserId};
use domain_claims::Caller;

use super::parse_id;
use crate::dto::hr::*;
use crate::{error::ApiError, AppState};

/// Lists every lecturer
pub async fn list_lecturers(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<LecturerResponse>>, ApiError> {
    let lecturers = state.hr.list_lecturers(&caller).await?;
    Ok(Json(lecturers.into_iter().map(LecturerResponse::from).collect()))
}

/// Updates a lecturer's name and email
pub async fn update_lecturer(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(request): Json<UpdateLecturerRequest>,
) -> Result<Json<LecturerResponse>, ApiError> {
    let lecturer_id: UserId = parse_id(&id)?;
    let profile = state
        .hr
        .edit_lecturer(&caller, lecturer_id, request.into())
        .await?;
    Ok(Json(profile.into()))
}

/// Downloads the report of an approved claim
pub async fn download_report(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let claim_id: ClaimId = parse_id(&id)?;
    let report = state.hr.render_report(&caller, claim_id).await?;

    let disposition = format!("attachment; filename=\"{}\"", report.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, report.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response())
}
