//! Contract Claims - API Server Binary
//!
//! This binary starts the HTTP API server for the contract claims system.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_UPLOAD_DIR` - Directory for supporting documents (default: uploads)
//! * `API_UPLOAD_URL_PREFIX` - URL path documents are served under (default: /uploads)
//! * `API_MAX_UPLOAD_BYTES` - Largest accepted request body (default: 10 MiB)
//! * `API_ORGANISATION` - Name printed on claim reports

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_claims::{seed_roles, ClaimWorkflow, HrDesk, HtmlReportRenderer, LocalAttachmentStore};
use infra_db::{
    create_pool, run_migrations, DatabaseConfig, PostgresClaimStore, PostgresLecturerDirectory,
    PostgresRoleRegistry,
};
use interface_api::{config::ApiConfig, create_router, AppState};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, connects to and migrates the
/// database, seeds the role catalogue and starts the HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Contract Claims API Server"
    );

    let pool = create_pool(
        DatabaseConfig::new(&config.database_url)
            .max_connections(10)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(30)),
    )
    .await
    .context("failed to connect to the database")?;

    run_migrations(&pool).await.context("failed to run migrations")?;

    let created = seed_roles(&PostgresRoleRegistry::new(pool.clone()))
        .await
        .context("failed to seed roles")?;
    tracing::info!(created = created.len(), "Role catalogue ready");

    let attachments = LocalAttachmentStore::new(&config.upload_dir, &config.upload_url_prefix)
        .await
        .context("failed to prepare the upload directory")?;
    let renderer = HtmlReportRenderer::new(&config.organisation)
        .context("failed to load the report template")?;

    let claims = Arc::new(PostgresClaimStore::new(pool.clone()));
    let directory = Arc::new(PostgresLecturerDirectory::new(pool));

    let workflow = ClaimWorkflow::new(claims.clone(), directory.clone(), Arc::new(attachments));
    let hr = HrDesk::new(claims, directory, Arc::new(renderer));

    let app = create_router(AppState::new(workflow, hr, config.clone()));

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("invalid server address")?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// In-flight requests complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
