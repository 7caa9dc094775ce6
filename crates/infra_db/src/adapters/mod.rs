//! Domain Adapters
//!
//! This module provides adapter implementations for the claim domain ports,
//! connecting them to the PostgreSQL database layer.
//!
//! # Architecture
//!
//! Each adapter:
//! - Implements a domain port trait
//! - Translates between domain models and database row types
//! - Uses the repository layer for database operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::{PostgresClaimStore, PostgresLecturerDirectory};
//!
//! let claims = PostgresClaimStore::new(pool.clone());
//! let directory = PostgresLecturerDirectory::new(pool);
//! ```

pub mod claims;
pub mod users;

pub use claims::PostgresClaimStore;
pub use users::{PostgresLecturerDirectory, PostgresRoleRegistry};
