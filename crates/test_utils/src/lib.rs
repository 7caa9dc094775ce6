//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! contract claims test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built users, callers and timestamps
//! - `builders`: Builder patterns for claims and lecturer profiles
//! - `environment`: Workflow and HR desk wired to in-memory adapters
//! - `database`: Database test helpers and container management
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod environment;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use environment::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
