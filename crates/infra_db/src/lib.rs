//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence for the claims system using
//! SQLx: connection pooling, schema migrations, repositories and the adapters
//! implementing the `domain_claims` ports.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories work with plain row
//! types; adapters translate rows to domain aggregates and database errors to
//! `PortError`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresClaimStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/claims")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresClaimStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PostgresClaimStore, PostgresLecturerDirectory, PostgresRoleRegistry};
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
