//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::{ClaimId, PortError};

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("Claim not found");

    match error {
        CoreError::NotFound(msg) => assert_eq!(msg, "Claim not found"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_core_error_from_uuid_error() {
    let uuid_error = "nope".parse::<ClaimId>().unwrap_err();
    let core_error: CoreError = uuid_error.into();

    assert!(matches!(core_error, CoreError::InvalidIdentifier(_)));
}

#[test]
fn test_core_error_display() {
    let error = CoreError::validation("Test error");
    let display = format!("{}", error);

    assert!(display.contains("Validation error"));
}

#[test]
fn test_port_error_field_validation_keeps_field() {
    let error = PortError::validation_field("Email already in use", "email");

    match error {
        PortError::Validation { field, message } => {
            assert_eq!(field.as_deref(), Some("email"));
            assert_eq!(message, "Email already in use");
        }
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_port_error_internal_with_source() {
    let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
    let error = PortError::internal_with("write failed", io);

    assert!(std::error::Error::source(&error).is_some());
    assert!(error.to_string().contains("write failed"));
}
