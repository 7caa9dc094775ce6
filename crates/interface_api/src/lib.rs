//! HTTP API Layer
//!
//! This crate provides the REST API for the contract claims system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for lecturers, academic managers and HR
//! - **Middleware**: Authentication, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Multipart**: Claim form and document upload parsing
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(workflow, hr, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod multipart;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use domain_claims::{ClaimWorkflow, HrDesk};

use crate::config::ApiConfig;
use crate::handlers::{claims, health, hr};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub workflow: ClaimWorkflow,
    pub hr: HrDesk,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(workflow: ClaimWorkflow, hr: HrDesk, config: ApiConfig) -> Self {
        Self {
            workflow,
            hr,
            config,
        }
    }
}

/// Creates the main API router
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let claims_routes = Router::new()
        .route("/claims", get(claims::list_claims).post(claims::submit_claim))
        .route("/claims/mine", get(claims::my_pending_claims))
        .route("/claims/:id/documents", post(claims::append_documents))
        .route("/claims/:id/approve", post(claims::approve_claim))
        .route("/claims/:id/reject", post(claims::reject_claim));

    let hr_routes = Router::new()
        .route("/hr/lecturers", get(hr::list_lecturers))
        .route("/hr/lecturers/:id", put(hr::update_lecturer))
        .route("/hr/claims/:id/report", get(hr::download_report));

    // Protected API routes
    let api_routes = Router::new()
        .merge(claims_routes)
        .merge(hr_routes)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Stored documents, readable by any signed-in user
    let upload_routes = Router::new()
        .nest_service(
            &state.config.upload_url_prefix,
            ServeDir::new(&state.config.upload_dir),
        )
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .merge(upload_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
