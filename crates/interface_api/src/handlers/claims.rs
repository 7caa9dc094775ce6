//! Claims handlers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use core_kernel::ClaimId;
use domain_claims::{Caller, ClaimAction, ClaimStatus};

use super::parse_id;
use crate::dto::claims::*;
use crate::multipart::{read_claim_form, read_files};
use crate::{error::ApiError, AppState};

/// Submits a new claim for the calling lecturer
pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitClaimResponse>), ApiError> {
    let form = read_claim_form(multipart).await?;
    let submission = state
        .workflow
        .submit_claim(&caller, form.fields, form.document)
        .await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// Lists the caller's own pending claims
pub async fn my_pending_claims(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let claims = state.workflow.pending_claims_for(&caller).await?;
    Ok(Json(claims.iter().map(ClaimResponse::from).collect()))
}

/// Appends supporting documents to one of the caller's pending claims
pub async fn append_documents(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<AppendResponse>, ApiError> {
    let claim_id: ClaimId = parse_id(&id)?;
    let files = read_files(multipart).await?;
    let outcome = state
        .workflow
        .append_supporting_files(&caller, claim_id, files)
        .await?;
    Ok(Json(outcome.into()))
}

/// Approves a pending claim
pub async fn approve_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    decide(state, caller, &id, ClaimAction::Approve).await
}

/// Rejects a pending claim
pub async fn reject_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    decide(state, caller, &id, ClaimAction::Reject).await
}

async fn decide(
    state: AppState,
    caller: Caller,
    id: &str,
    action: ClaimAction,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim_id: ClaimId = parse_id(id)?;
    let claim = state
        .workflow
        .transition_claim(&caller, claim_id, action)
        .await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

/// Lists claims in one status together with their lecturers
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ListClaimsQuery>,
) -> Result<Json<Vec<ClaimWithOwnerResponse>>, ApiError> {
    let status = match query.status.as_deref() {
        None => ClaimStatus::Pending,
        Some(raw) => raw.parse::<ClaimStatus>().map_err(ApiError::BadRequest)?,
    };

    let claims = state.workflow.list_claims_by_status(&caller, status).await?;
    Ok(Json(claims.iter().map(ClaimWithOwnerResponse::from).collect()))
}
