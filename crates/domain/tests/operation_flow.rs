//! End-to-end scenarios over the pure domain pipeline: normalization,
//! safety gating, and confirmation resolution, without a database.

use chrono::{TimeZone, Utc};

use domain::error::{OperationError, SafetyRule};
use domain::models::{
    ConversationExchange, FilterSet, LogTable, OperationAction, OperationDescriptor,
};
use domain::services::{confirmation, safety_gate};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
}

fn exchange(
    user_message: &str,
    bot_response: &str,
    table_name: Option<&str>,
    operation_type: &str,
) -> ConversationExchange {
    ConversationExchange {
        user_message: user_message.into(),
        bot_response: bot_response.into(),
        table_name: table_name.map(String::from),
        operation_type: Some(operation_type.into()),
        created_at: Utc::now(),
    }
}

#[test]
fn archive_below_minimum_age_is_rejected_before_anything_runs() {
    // Scenario B: "archive dsiactivities older_than_3_days" is rejected
    // immediately with the specific rule and both ages.
    let descriptor = OperationDescriptor::archive(
        LogTable::DsiActivities,
        FilterSet {
            date_filter: Some("older_than_3_days".into()),
            ..Default::default()
        },
    );

    match safety_gate::validate_at(&descriptor, now()) {
        Err(OperationError::Safety(v)) => {
            assert_eq!(v.rule, SafetyRule::ArchiveMinAge);
            assert_eq!(v.required_days, 7);
            assert_eq!(v.requested_days, 3);
        }
        other => panic!("expected safety violation, got {:?}", other),
    }
}

#[test]
fn confirm_delete_without_prior_preview_fails_closed() {
    // Scenario C: CONFIRM DELETE with no delete preview in the session.
    let history = vec![
        exchange("hello", "Hi, I manage inventory logs", None, "select"),
        exchange(
            "show dsiactivities from yesterday",
            "Here are 8 record(s)",
            Some("dsiactivities"),
            "select",
        ),
    ];

    let signal = confirmation::detect_signal("CONFIRM DELETE").expect("signal");
    match confirmation::resolve(signal, &history) {
        Err(OperationError::Resolution(f)) => {
            assert_eq!(f.operation, OperationAction::Delete);
            assert!(f.to_string().contains("name the table explicitly"));
        }
        other => panic!("expected resolution failure, got {:?}", other),
    }
}

#[test]
fn cancel_after_pending_preview_reaches_no_destructive_path() {
    // Scenario D: CANCEL after an archive preview resolves to a
    // cancellation; no descriptor exists to execute.
    let history = vec![exchange(
        "archive dsiactivities older_than_10_days",
        "Archive Preview: 12 matching record(s). Reply CONFIRM ARCHIVE to proceed or CANCEL to abort.",
        Some("dsiactivities"),
        "archive",
    )];

    let signal = confirmation::detect_signal("cancel").expect("signal");
    let resolution = confirmation::resolve(signal, &history).expect("resolution");
    assert_eq!(resolution, confirmation::Resolution::Cancelled);
}

#[test]
fn confirmed_replay_passes_gate_with_original_filters() {
    // The front half of scenario A: a confirmation replay rebuilds the
    // previewed operation and clears the safety gate with the filters from
    // the original message.
    let history = vec![exchange(
        "archive dsiactivities older_than_10_days",
        "Archive Preview: 12 matching record(s). Reply CONFIRM ARCHIVE to proceed or CANCEL to abort.",
        Some("dsiactivities"),
        "archive",
    )];

    let signal = confirmation::detect_signal("confirm archive").expect("signal");
    let descriptor = match confirmation::resolve(signal, &history).expect("resolution") {
        confirmation::Resolution::Execute(d) => d,
        other => panic!("expected execute, got {:?}", other),
    };

    let normalized = safety_gate::validate_at(&descriptor, now()).expect("gate pass");
    // 10 days before 2026-06-15 12:00:00.
    assert_eq!(normalized.cutoff.as_deref(), Some("20260605120000"));
    assert!(descriptor.confirmed);
}

#[test]
fn confirmed_replay_of_too_recent_filter_is_still_rejected() {
    // A preview that somehow slipped a too-recent filter into history must
    // still be rejected at execution time: the gate runs unconditionally.
    let history = vec![exchange(
        "archive dsiactivities older_than_2_days",
        "Archive Preview: 3 matching record(s). Reply CONFIRM ARCHIVE to proceed or CANCEL to abort.",
        Some("dsiactivities"),
        "archive",
    )];

    let signal = confirmation::detect_signal("confirm archive").expect("signal");
    let descriptor = match confirmation::resolve(signal, &history).expect("resolution") {
        confirmation::Resolution::Execute(d) => d,
        other => panic!("expected execute, got {:?}", other),
    };

    assert!(matches!(
        safety_gate::validate_at(&descriptor, now()),
        Err(OperationError::Safety(_))
    ));
}
