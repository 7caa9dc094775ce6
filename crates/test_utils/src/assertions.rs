//! Custom Test Assertions
//!
//! Assertion helpers for domain results that print the actual error or
//! status instead of a bare `assertion failed`.

use std::fmt::Debug;

use rust_decimal::Decimal;

use domain_claims::{ClaimError, ClaimStatus, ClaimSubmission};

/// Asserts that a result failed validation on exactly the given fields
///
/// Field order does not matter.
pub fn assert_validation_fields<T: Debug>(result: &Result<T, ClaimError>, expected: &[&str]) {
    let err = match result {
        Err(err @ ClaimError::Validation(_)) => err,
        other => panic!("Expected a validation error on {:?}, got {:?}", expected, other),
    };

    let mut actual: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
    actual.sort_unstable();
    let mut expected = expected.to_vec();
    expected.sort_unstable();

    assert_eq!(actual, expected, "Validation failed on unexpected fields: {}", err);
}

/// Asserts that a result was refused for lack of a role or ownership
pub fn assert_forbidden<T: Debug>(result: &Result<T, ClaimError>) {
    assert!(
        matches!(result, Err(ClaimError::Forbidden(_))),
        "Expected Forbidden, got {:?}",
        result
    );
}

/// Asserts that a result reports a missing claim or lecturer
pub fn assert_not_found<T: Debug>(result: &Result<T, ClaimError>) {
    assert!(
        matches!(result, Err(e) if e.is_not_found()),
        "Expected a not-found error, got {:?}",
        result
    );
}

/// Asserts that a transition was refused from the given status
pub fn assert_invalid_transition<T: Debug>(result: &Result<T, ClaimError>, from: ClaimStatus) {
    match result {
        Err(ClaimError::InvalidStatusTransition { from: actual, .. }) => assert_eq!(
            *actual, from,
            "Transition refused from {} but expected {}",
            actual, from
        ),
        other => panic!("Expected InvalidStatusTransition from {}, got {:?}", from, other),
    }
}

/// Asserts a claim's status
pub fn assert_status(claim: &ClaimSubmission, expected: ClaimStatus) {
    assert_eq!(
        claim.status(),
        expected,
        "Claim {} is {} but expected {}",
        claim.id(),
        claim.status(),
        expected
    );
}

/// Asserts a claim's final payment, ignoring trailing zeros
pub fn assert_final_payment(claim: &ClaimSubmission, expected: Decimal) {
    assert_eq!(
        claim.final_payment().normalize(),
        expected.normalize(),
        "Claim {} pays {} but expected {}",
        claim.id(),
        claim.final_payment(),
        expected
    );
}
