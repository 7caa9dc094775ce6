//! Property-Based Test Generators
//!
//! Proptest strategies for claim inputs and decisions.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_claims::{ClaimAction, ClaimFields, ClaimStatus};

/// Non-negative amounts with up to two decimal places (0 to 10 000)
pub fn non_negative_amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64, 0u32..=2u32).prop_map(|(m, s)| Decimal::new(m, s))
}

/// Strictly negative amounts
pub fn negative_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64, 0u32..=2u32).prop_map(|(m, s)| -Decimal::new(m, s))
}

/// Optional free-text notes
pub fn notes_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Za-z0-9 ,.]{1,80}")
}

/// Complete, valid claim form input
pub fn valid_claim_fields_strategy() -> impl Strategy<Value = ClaimFields> {
    (
        non_negative_amount_strategy(),
        non_negative_amount_strategy(),
        notes_strategy(),
    )
        .prop_map(|(hours, rate, notes)| ClaimFields {
            hours_worked: Some(hours),
            hourly_rate: Some(rate),
            additional_notes: notes,
        })
}

/// Claim form input that may be missing or have negative amounts
pub fn arbitrary_claim_fields_strategy() -> impl Strategy<Value = ClaimFields> {
    let amount = prop_oneof![
        3 => non_negative_amount_strategy().prop_map(Some),
        1 => negative_amount_strategy().prop_map(Some),
        1 => Just(None),
    ];
    (amount.clone(), amount, notes_strategy()).prop_map(|(hours, rate, notes)| ClaimFields {
        hours_worked: hours,
        hourly_rate: rate,
        additional_notes: notes,
    })
}

pub fn action_strategy() -> impl Strategy<Value = ClaimAction> {
    prop_oneof![Just(ClaimAction::Approve), Just(ClaimAction::Reject)]
}

pub fn status_strategy() -> impl Strategy<Value = ClaimStatus> {
    prop_oneof![
        Just(ClaimStatus::Pending),
        Just(ClaimStatus::Approved),
        Just(ClaimStatus::Rejected),
    ]
}
