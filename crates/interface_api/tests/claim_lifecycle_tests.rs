//! Claim lifecycle scenarios
//!
//! These tests drive the workflow and HR desk end to end against the
//! in-memory adapters: submission, decision, listing and reporting.

use rust_decimal_macros::dec;

use core_kernel::ClaimId;
use domain_claims::{
    seed_roles, AttachmentError, ClaimAction, ClaimError, ClaimStatus, ClaimStore, LecturerUpdate,
    Role, Upload, MAX_HOURLY_RATE, MAX_HOURS_WORKED, UPLOAD_FAILED_WARNING,
};
use test_utils::*;

mod submission {
    use super::*;

    /// 10 hours at 20 per hour pays 200.00 and shows up for HR once approved
    #[tokio::test]
    async fn test_submit_approve_and_list_for_hr() {
        let env = TestEnvironment::with_fixture_users().await;

        let submission = env
            .workflow
            .submit_claim(
                &env.lecturer(),
                ClaimFieldsBuilder::new()
                    .with_hours(dec!(10))
                    .with_rate(dec!(20))
                    .build(),
                None,
            )
            .await
            .unwrap();
        let claim = submission.claim;
        assert_status(&claim, ClaimStatus::Pending);
        assert_final_payment(&claim, dec!(200.00));

        let approved = env
            .workflow
            .transition_claim(&env.manager(), claim.id(), ClaimAction::Approve)
            .await
            .unwrap();
        assert_status(&approved, ClaimStatus::Approved);

        let listed = env
            .workflow
            .list_claims_by_status(&env.hr_caller(), ClaimStatus::Approved)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].claim.id(), claim.id());
        assert_eq!(listed[0].owner.full_name, "Ada Lovelace");
        assert_eq!(listed[0].final_payment(), dec!(200));
    }

    /// A claim without hours is rejected and nothing is stored
    #[tokio::test]
    async fn test_missing_hours_leaves_store_unchanged() {
        let env = TestEnvironment::with_fixture_users().await;
        let before = env.claims.count().await.unwrap();

        let result = env
            .workflow
            .submit_claim(
                &env.lecturer(),
                ClaimFieldsBuilder::new().without_hours().build(),
                Some(Upload::new("timesheet.pdf", b"%PDF".to_vec())),
            )
            .await;

        assert_validation_fields(&result, &["hours_worked"]);
        assert_eq!(env.claims.count().await.unwrap(), before);
        assert_eq!(env.attachments.file_count().await, 0);
    }

    /// Every failing field is reported at once
    #[tokio::test]
    async fn test_all_field_errors_reported_together() {
        let env = TestEnvironment::with_fixture_users().await;

        let result = env
            .workflow
            .submit_claim(
                &env.lecturer(),
                ClaimFieldsBuilder::new()
                    .with_hours(dec!(-1))
                    .without_rate()
                    .build(),
                None,
            )
            .await;

        assert_validation_fields(&result, &["hours_worked", "hourly_rate"]);
    }

    /// A failed document upload does not block the claim
    #[tokio::test]
    async fn test_failed_upload_becomes_warning() {
        let env = TestEnvironment::with_fixture_users().await;
        env.attachments.fail_writes(true);

        let submission = env
            .workflow
            .submit_claim(
                &env.lecturer(),
                ClaimFieldsBuilder::new().build(),
                Some(Upload::new("timesheet.pdf", b"%PDF".to_vec())),
            )
            .await
            .unwrap();

        assert_eq!(submission.warnings, vec![UPLOAD_FAILED_WARNING.to_string()]);
        assert!(submission.claim.supporting_document().is_none());
        assert_eq!(env.claims.count().await.unwrap(), 1);
    }

    /// Amounts whose product would overflow are refused before anything is stored
    #[tokio::test]
    async fn test_oversized_amounts_rejected() {
        let env = TestEnvironment::with_fixture_users().await;

        let result = env
            .workflow
            .submit_claim(
                &env.lecturer(),
                ClaimFieldsBuilder::new()
                    .with_hours(dec!(79228162514264337593543950335))
                    .with_rate(dec!(2))
                    .build(),
                None,
            )
            .await;

        assert_validation_fields(&result, &["hours_worked"]);
        assert_eq!(env.claims.count().await.unwrap(), 0);

        let pending = env
            .workflow
            .list_claims_by_status(&env.manager(), ClaimStatus::Pending)
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    /// The largest accepted amounts still produce a payment
    #[tokio::test]
    async fn test_largest_amounts_accepted() {
        let env = TestEnvironment::with_fixture_users().await;

        let claim = env
            .workflow
            .submit_claim(
                &env.lecturer(),
                ClaimFieldsBuilder::new()
                    .with_hours(MAX_HOURS_WORKED)
                    .with_rate(MAX_HOURLY_RATE)
                    .build(),
                None,
            )
            .await
            .unwrap()
            .claim;

        assert_final_payment(&claim, dec!(1000000000000));
    }

    /// Only lecturers may submit
    #[tokio::test]
    async fn test_manager_cannot_submit() {
        let env = TestEnvironment::with_fixture_users().await;

        let result = env
            .workflow
            .submit_claim(&env.manager(), ClaimFieldsBuilder::new().build(), None)
            .await;

        assert_forbidden(&result);
        assert_eq!(env.claims.count().await.unwrap(), 0);
    }
}

mod decisions {
    use super::*;

    /// A decided claim never changes status again
    #[tokio::test]
    async fn test_decided_claim_is_final() {
        let env = TestEnvironment::with_fixture_users().await;
        let claim = env.seed_claim(ClaimBuilder::new().build()).await;

        env.workflow
            .transition_claim(&env.manager(), claim.id(), ClaimAction::Reject)
            .await
            .unwrap();

        for action in [ClaimAction::Approve, ClaimAction::Reject] {
            let result = env
                .workflow
                .transition_claim(&env.manager(), claim.id(), action)
                .await;
            assert_invalid_transition(&result, ClaimStatus::Rejected);
        }

        let stored = env.claims.get(claim.id()).await.unwrap().unwrap();
        assert_status(&stored, ClaimStatus::Rejected);
    }

    /// Deciding an unknown claim reports it as missing
    #[tokio::test]
    async fn test_unknown_claim_not_found() {
        let env = TestEnvironment::with_fixture_users().await;

        let result = env
            .workflow
            .transition_claim(&env.manager(), ClaimId::new(), ClaimAction::Approve)
            .await;

        assert_not_found(&result);
    }

    /// Two managers deciding at once: exactly one wins
    #[tokio::test]
    async fn test_concurrent_decisions_have_one_winner() {
        let env = TestEnvironment::with_fixture_users().await;
        let claim = env.seed_claim(ClaimBuilder::new().build()).await;
        let manager = env.manager();

        let (approve, reject) = tokio::join!(
            env.workflow
                .transition_claim(&manager, claim.id(), ClaimAction::Approve),
            env.workflow
                .transition_claim(&manager, claim.id(), ClaimAction::Reject),
        );

        assert_eq!(
            [approve.is_ok(), reject.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
        let loser = if approve.is_ok() { reject } else { approve };
        assert!(matches!(
            loser,
            Err(ClaimError::InvalidStatusTransition { .. })
        ));
    }

    /// Lecturers and HR cannot decide claims
    #[tokio::test]
    async fn test_only_managers_decide() {
        let env = TestEnvironment::with_fixture_users().await;
        let claim = env.seed_claim(ClaimBuilder::new().build()).await;

        for caller in [env.lecturer(), env.hr_caller()] {
            let result = env
                .workflow
                .transition_claim(&caller, claim.id(), ClaimAction::Approve)
                .await;
            assert_forbidden(&result);
        }
    }
}

mod listings {
    use super::*;
    use proptest::prelude::*;

    /// Claims come back oldest first
    #[tokio::test]
    async fn test_pending_listing_is_oldest_first() {
        let env = TestEnvironment::with_fixture_users().await;
        let newer = env
            .seed_claim(
                ClaimBuilder::new()
                    .submitted_at(*SUBMITTED_AT + chrono::Duration::hours(1))
                    .build(),
            )
            .await;
        let older = env.seed_claim(ClaimBuilder::new().build()).await;

        let listed = env
            .workflow
            .list_claims_by_status(&env.manager(), ClaimStatus::Pending)
            .await
            .unwrap();

        let ids: Vec<ClaimId> = listed.iter().map(|c| c.claim.id()).collect();
        assert_eq!(ids, vec![older.id(), newer.id()]);
    }

    /// HR only sees approved claims
    #[tokio::test]
    async fn test_hr_cannot_list_pending() {
        let env = TestEnvironment::with_fixture_users().await;

        let result = env
            .workflow
            .list_claims_by_status(&env.hr_caller(), ClaimStatus::Pending)
            .await;

        assert_forbidden(&result);
    }

    /// A lecturer's own listing excludes other lecturers' and decided claims
    #[tokio::test]
    async fn test_own_pending_claims_only() {
        let env = TestEnvironment::with_fixture_users().await;
        let mine = env.seed_claim(ClaimBuilder::new().build()).await;
        env.seed_claim(
            ClaimBuilder::new()
                .with_status(ClaimStatus::Approved)
                .build(),
        )
        .await;
        env.seed_claim(
            ClaimBuilder::new()
                .owned_by(IdFixtures::other_lecturer_id())
                .build(),
        )
        .await;

        let claims = env.workflow.pending_claims_for(&env.lecturer()).await.unwrap();

        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].id(), mine.id());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Every claim lands in exactly one status bucket
        #[test]
        fn claims_partition_across_status_buckets(
            decisions in proptest::collection::vec(proptest::option::of(action_strategy()), 0..12)
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let env = TestEnvironment::with_fixture_users().await;

                for decision in &decisions {
                    let claim = env
                        .workflow
                        .submit_claim(&env.lecturer(), ClaimFieldsBuilder::new().build(), None)
                        .await
                        .unwrap()
                        .claim;
                    if let Some(action) = decision {
                        env.workflow
                            .transition_claim(&env.manager(), claim.id(), *action)
                            .await
                            .unwrap();
                    }
                }

                let mut seen = std::collections::HashSet::new();
                let mut total = 0;
                for status in ClaimStatus::ALL {
                    let bucket = env
                        .workflow
                        .list_claims_by_status(&env.manager(), status)
                        .await
                        .unwrap();
                    for entry in &bucket {
                        assert_eq!(entry.claim.status(), status);
                        assert!(seen.insert(entry.claim.id()));
                    }
                    total += bucket.len();
                }

                assert_eq!(total, decisions.len());
                assert_eq!(env.claims.count().await.unwrap(), decisions.len() as u64);
            });
        }
    }
}

mod supporting_files {
    use super::*;

    /// Appending to a missing claim writes nothing
    #[tokio::test]
    async fn test_append_to_unknown_claim_writes_nothing() {
        let env = TestEnvironment::with_fixture_users().await;

        let result = env
            .workflow
            .append_supporting_files(
                &env.lecturer(),
                ClaimId::new(),
                vec![Upload::new("extra.pdf", b"data".to_vec())],
            )
            .await;

        assert_not_found(&result);
        assert_eq!(env.attachments.file_count().await, 0);
    }

    /// Files go under the claim and empty ones are skipped
    #[tokio::test]
    async fn test_append_stores_non_empty_files() {
        let env = TestEnvironment::with_fixture_users().await;
        let claim = env.seed_claim(ClaimBuilder::new().build()).await;

        let outcome = env
            .workflow
            .append_supporting_files(
                &env.lecturer(),
                claim.id(),
                vec![
                    Upload::new("week1.pdf", b"one".to_vec()),
                    Upload::new("empty.pdf", Vec::new()),
                    Upload::new("week2.pdf", b"two".to_vec()),
                ],
            )
            .await
            .unwrap();

        assert_eq!(outcome.stored.len(), 2);
        assert_eq!(outcome.skipped, vec!["empty.pdf".to_string()]);
        assert_eq!(env.claims.attachments_for(claim.id()).await.len(), 2);
        assert!(outcome.stored[0]
            .reference
            .as_str()
            .contains(&format!("claim_{}", claim.id().as_uuid())));
    }

    /// Another lecturer's claim is off limits
    #[tokio::test]
    async fn test_append_to_foreign_claim_forbidden() {
        let env = TestEnvironment::with_fixture_users().await;
        let claim = env.seed_claim(ClaimBuilder::new().build()).await;

        let result = env
            .workflow
            .append_supporting_files(
                &env.other_lecturer(),
                claim.id(),
                vec![Upload::new("extra.pdf", b"data".to_vec())],
            )
            .await;

        assert_forbidden(&result);
        assert_eq!(env.attachments.file_count().await, 0);
    }

    /// An unusable name anywhere in the batch rejects it before any write
    #[tokio::test]
    async fn test_invalid_name_in_batch_writes_nothing() {
        let env = TestEnvironment::with_fixture_users().await;
        let claim = env.seed_claim(ClaimBuilder::new().build()).await;

        let result = env
            .workflow
            .append_supporting_files(
                &env.lecturer(),
                claim.id(),
                vec![
                    Upload::new("a.pdf", b"one".to_vec()),
                    Upload::new("..", b"two".to_vec()),
                ],
            )
            .await;

        assert!(matches!(
            result,
            Err(ClaimError::Storage(AttachmentError::InvalidFileName(ref name))) if name == ".."
        ));
        assert_eq!(env.attachments.file_count().await, 0);
        assert!(env.claims.attachments_for(claim.id()).await.is_empty());
    }

    /// Files written before a failing one stay recorded against the claim
    #[tokio::test]
    async fn test_failed_write_records_earlier_files() {
        let env = TestEnvironment::with_fixture_users().await;
        let claim = env.seed_claim(ClaimBuilder::new().build()).await;
        env.attachments.fail_after(1).await;

        let result = env
            .workflow
            .append_supporting_files(
                &env.lecturer(),
                claim.id(),
                vec![
                    Upload::new("week1.pdf", b"one".to_vec()),
                    Upload::new("week2.pdf", b"two".to_vec()),
                    Upload::new("week3.pdf", b"three".to_vec()),
                ],
            )
            .await;

        assert!(matches!(result, Err(ClaimError::Storage(AttachmentError::Io { .. }))));
        assert_eq!(env.attachments.file_count().await, 1);

        let recorded = env.claims.attachments_for(claim.id()).await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].file_name, "week1.pdf");
        assert_eq!(
            env.attachments.content(&recorded[0].reference).await,
            Some(b"one".to_vec())
        );
    }

    /// Decided claims no longer take documents
    #[tokio::test]
    async fn test_append_to_approved_claim_refused() {
        let env = TestEnvironment::with_fixture_users().await;
        let claim = env
            .seed_claim(ClaimBuilder::new().with_status(ClaimStatus::Approved).build())
            .await;

        let result = env
            .workflow
            .append_supporting_files(
                &env.lecturer(),
                claim.id(),
                vec![Upload::new("late.pdf", b"data".to_vec())],
            )
            .await;

        assert!(matches!(
            result,
            Err(ClaimError::ClaimClosed { status: ClaimStatus::Approved, .. })
        ));
        assert_eq!(env.attachments.file_count().await, 0);
    }
}

mod hr_desk {
    use super::*;

    #[tokio::test]
    async fn test_lecturers_listed_by_name() {
        let env = TestEnvironment::with_fixture_users().await;

        let lecturers = env.hr.list_lecturers(&env.hr_caller()).await.unwrap();

        let names: Vec<&str> = lecturers.iter().map(|l| l.full_name.as_str()).collect();
        assert_eq!(names, vec!["Ada Lovelace", "Charles Babbage"]);
    }

    #[tokio::test]
    async fn test_edit_lecturer_updates_listing() {
        let env = TestEnvironment::with_fixture_users().await;

        env.hr
            .edit_lecturer(
                &env.hr_caller(),
                IdFixtures::lecturer_id(),
                LecturerUpdate {
                    full_name: "  Augusta Ada King ".to_string(),
                    email: "ada.king@example.edu".to_string(),
                },
            )
            .await
            .unwrap();

        let lecturers = env.hr.list_lecturers(&env.hr_caller()).await.unwrap();
        assert!(lecturers
            .iter()
            .any(|l| l.full_name == "Augusta Ada King" && l.email == "ada.king@example.edu"));
    }

    #[tokio::test]
    async fn test_report_requires_approved_claim() {
        let env = TestEnvironment::with_fixture_users().await;
        let claim = env.seed_claim(ClaimBuilder::new().build()).await;

        let result = env.hr.render_report(&env.hr_caller(), claim.id()).await;

        assert!(matches!(
            result,
            Err(ClaimError::ReportUnavailable(ClaimStatus::Pending))
        ));
    }

    #[tokio::test]
    async fn test_report_for_approved_claim() {
        let env = TestEnvironment::with_fixture_users().await;
        let claim = env
            .seed_claim(
                ClaimBuilder::new()
                    .with_hours(dec!(7.5))
                    .with_rate(dec!(33.333))
                    .with_status(ClaimStatus::Approved)
                    .build(),
            )
            .await;

        let report = env.hr.claim_report(&env.hr_caller(), claim.id()).await.unwrap();
        assert_eq!(report.total_payment, dec!(250.00));
        assert_eq!(report.lecturer_name, "Ada Lovelace");

        let rendered = env.hr.render_report(&env.hr_caller(), claim.id()).await.unwrap();
        let html = String::from_utf8(rendered.bytes).unwrap();
        assert!(html.contains(TEST_ORGANISATION));
        assert!(html.contains("Ada Lovelace"));
        assert_eq!(
            rendered.file_name,
            format!("ClaimReport_{}.html", claim.id().as_uuid())
        );
    }
}

mod roles {
    use super::*;

    /// Seeding twice creates each role once
    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let env = TestEnvironment::new();

        let first = seed_roles(&env.roles).await.unwrap();
        let second = seed_roles(&env.roles).await.unwrap();

        assert_eq!(first, Role::ALL.to_vec());
        assert!(second.is_empty());
        assert_eq!(env.roles.roles().await.len(), 3);
    }
}
