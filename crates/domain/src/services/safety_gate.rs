//! Pre-execution safety validation.
//!
//! The gate is the last word before any destructive SQL runs. It is pure
//! over the descriptor and the wall clock, and it runs on every path —
//! fresh parse, confirmation replay, or direct structured call. A
//! `confirmed` descriptor skips the preview step, never this check.

use chrono::{DateTime, Duration, Utc};

use crate::error::{OperationError, SafetyRule, SafetyViolation};
use crate::models::{OperationAction, OperationDescriptor};
use crate::services::filter_normalizer::{self, NormalizedFilters};
use shared::timestamp::parse_log_timestamp;

/// Validates a descriptor and returns its normalized filters on success.
pub fn validate(descriptor: &OperationDescriptor) -> Result<NormalizedFilters, OperationError> {
    validate_at(descriptor, Utc::now())
}

/// Validation against an explicit clock, for deterministic tests.
pub fn validate_at(
    descriptor: &OperationDescriptor,
    now: DateTime<Utc>,
) -> Result<NormalizedFilters, OperationError> {
    if !descriptor.validation_errors.is_empty() {
        return Err(OperationError::Validation(
            descriptor.validation_errors.join("; "),
        ));
    }

    if descriptor.action == OperationAction::Delete && !descriptor.is_archive_target {
        return Err(OperationError::Validation(format!(
            "delete is only permitted against archive tables; {} is a main table",
            descriptor.table.main_table_name()
        )));
    }

    // Re-derive the cutoff regardless of how the filter values arrived.
    let normalized = filter_normalizer::normalize_at(&descriptor.filters, descriptor.action, now)?;

    // Independent recency assertion over the derived cutoff. Normalization
    // already enforces the rules per expression; this catches any future
    // path that hands the gate a pre-resolved cutoff.
    if let (Some(required), Some(rule), Some(cutoff)) = (
        descriptor.action.minimum_age_days(),
        SafetyRule::for_action(descriptor.action),
        normalized.cutoff.as_deref(),
    ) {
        let cutoff_ts = parse_log_timestamp(cutoff)
            .ok_or_else(|| OperationError::Validation("unparseable derived cutoff".into()))?;
        if cutoff_ts > now - Duration::days(required) {
            return Err(SafetyViolation {
                rule,
                required_days: required,
                requested_days: (now - cutoff_ts).num_days().max(0),
                cutoff: Some(cutoff.to_string()),
            }
            .into());
        }
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilterSet, LogTable};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    fn filters(expr: &str) -> FilterSet {
        FilterSet {
            date_filter: Some(expr.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_delete_against_main_table_rejected() {
        let mut descriptor = OperationDescriptor::delete_archived(
            LogTable::DsiActivities,
            filters("older_than_60_days"),
        );
        descriptor.is_archive_target = false;

        match validate_at(&descriptor, at()) {
            Err(OperationError::Validation(msg)) => {
                assert!(msg.contains("archive tables"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_against_archive_table_passes() {
        let descriptor = OperationDescriptor::delete_archived(
            LogTable::DsiActivities,
            filters("older_than_60_days"),
        );
        let normalized = validate_at(&descriptor, at()).unwrap();
        assert!(normalized.cutoff.is_some());
    }

    #[test]
    fn test_unresolved_validation_errors_rejected() {
        let mut descriptor =
            OperationDescriptor::archive(LogTable::DsiActivities, filters("older_than_30_days"));
        descriptor.validation_errors.push("missing table".into());
        assert!(matches!(
            validate_at(&descriptor, at()),
            Err(OperationError::Validation(_))
        ));
    }

    #[test]
    fn test_confirmed_descriptor_still_age_checked() {
        let descriptor =
            OperationDescriptor::archive(LogTable::DsiActivities, filters("older_than_3_days"))
                .confirmed();
        match validate_at(&descriptor, at()) {
            Err(OperationError::Safety(v)) => {
                assert_eq!(v.required_days, 7);
                assert_eq!(v.requested_days, 3);
            }
            other => panic!("expected safety violation, got {:?}", other),
        }
    }

    #[test]
    fn test_recent_raw_cutoff_rejected_even_with_older_than_mode() {
        // A replayed descriptor carrying a too-recent concrete cutoff must
        // not slip through on the strength of its comparison flag.
        let descriptor = OperationDescriptor::archive(
            LogTable::DsiTransactionLog,
            FilterSet {
                date_end: Some("20260614000000".into()),
                date_comparison: Some(crate::models::DateComparison::OlderThan),
                ..Default::default()
            },
        );
        assert!(matches!(
            validate_at(&descriptor, at()),
            Err(OperationError::Safety(_))
        ));
    }
}
