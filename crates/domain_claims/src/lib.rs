//! Claim Lifecycle Domain
//!
//! This crate implements the lecturer claim lifecycle: submission with an
//! optional supporting document, approval or rejection by an academic
//! manager, additional uploads while the claim is pending, and HR reporting.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Submitted -> Pending -> Approved
//!                      -> Rejected
//! ```
//!
//! Every operation is gated by the caller's roles (see [`access`]). Storage,
//! identity and file handling sit behind the ports in [`ports`] and
//! [`attachment`].

pub mod access;
pub mod attachment;
pub mod claim;
pub mod error;
pub mod hr;
pub mod lecturer;
pub mod ports;
pub mod report;
pub mod validation;
pub mod workflow;

pub use access::{authorize, seed_roles, Caller, Operation, Role, RoleSet};
pub use attachment::{
    AttachmentError, AttachmentRef, AttachmentScope, AttachmentStore, LocalAttachmentStore,
    StoredAttachment, Upload,
};
pub use claim::{ClaimAction, ClaimStatus, ClaimSubmission};
pub use error::ClaimError;
pub use hr::HrDesk;
pub use lecturer::{ClaimWithOwner, LecturerProfile, LecturerUpdate};
pub use ports::{ClaimStore, LecturerDirectory, RoleRegistry};
pub use report::{ClaimReport, HtmlReportRenderer, RenderedReport, ReportError, ReportRenderer};
pub use validation::{
    ClaimFields, ClaimValidator, FieldError, ValidClaimFields, ValidationResult, MAX_HOURLY_RATE,
    MAX_HOURS_WORKED,
};
pub use workflow::{AppendOutcome, ClaimWorkflow, Submission, UPLOAD_FAILED_WARNING};
