//! Core Kernel - Foundational types for the contract claims system
//!
//! This crate provides the building blocks shared by the domain, persistence
//! and HTTP layers:
//! - Strongly-typed identifiers for claims and users
//! - The kernel error type
//! - Port error and marker traits for the ports and adapters layout

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{ClaimId, UserId, AttachmentId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
