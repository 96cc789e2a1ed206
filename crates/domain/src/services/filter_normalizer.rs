//! Date-filter normalization and minimum-age enforcement.
//!
//! Turns a symbolic date-filter expression into a concrete cutoff timestamp
//! (char(14) `YYYYMMDDHHMMSS`) plus a comparison mode, enforcing the
//! minimum-age rules along the way:
//!
//! - ARCHIVE touches nothing younger than 7 days.
//! - DELETE touches nothing younger than 30 days.
//! - `yesterday` and `recent` are unconditionally too recent for either.
//!
//! Month and year units are fixed 30-day / 365-day approximations, not
//! calendar arithmetic.

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{OperationError, SafetyRule, SafetyViolation};
use crate::models::{DateComparison, FilterSet, OperationAction};
use shared::timestamp::{format_log_timestamp, is_valid_log_timestamp, parse_log_timestamp};

lazy_static! {
    static ref OLDER_THAN_RE: Regex =
        Regex::new(r"^older_than_(\d+)_(day|days|month|months|year|years)$").unwrap();
    static ref DATE_EXPR_RE: Regex =
        Regex::new(r"\bolder_than_\d+_(?:day|days|month|months|year|years)\b|\byesterday\b|\brecent\b").unwrap();
}

/// Days represented by each supported unit. Months and years are deliberate
/// fixed-length approximations.
fn unit_days(unit: &str) -> i64 {
    match unit {
        "day" | "days" => 1,
        "month" | "months" => 30,
        "year" | "years" => 365,
        _ => unreachable!("unit constrained by regex"),
    }
}

fn count_out_of_range(expr: &str) -> OperationError {
    OperationError::Validation(format!("date filter count out of range: {}", expr))
}

/// The fully resolved date constraints of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFilters {
    /// Concrete cutoff, when the operation has an upper date bound.
    pub cutoff: Option<String>,
    /// Comparison mode for the cutoff; present iff `cutoff` is.
    pub comparison: Option<DateComparison>,
    /// Concrete lower date bound, when one applies.
    pub date_start: Option<String>,
    /// The original filter set with the resolved fields filled in.
    pub resolved: FilterSet,
}

/// Normalizes a filter set against the current wall clock.
pub fn normalize(
    filters: &FilterSet,
    action: OperationAction,
) -> Result<NormalizedFilters, OperationError> {
    normalize_at(filters, action, Utc::now())
}

/// Normalizes a filter set at an explicit point in time. Pure; the wall
/// clock enters only through `now`.
pub fn normalize_at(
    filters: &FilterSet,
    action: OperationAction,
    now: DateTime<Utc>,
) -> Result<NormalizedFilters, OperationError> {
    let min_age = action.minimum_age_days();

    let mut cutoff: Option<String> = None;
    let mut comparison: Option<DateComparison> = None;
    let mut date_start: Option<String> = None;

    if let Some(raw_start) = filters.date_start.as_deref() {
        if !is_valid_log_timestamp(raw_start) {
            return Err(OperationError::Validation(format!(
                "date_start is not a valid YYYYMMDDHHMMSS timestamp: {}",
                raw_start
            )));
        }
        date_start = Some(raw_start.to_string());
    }

    if let Some(expr) = filters.date_filter.as_deref() {
        let expr = expr.trim().to_lowercase();
        match expr.as_str() {
            // Symbolic shortcuts for "within the last ~1-7 days". Always too
            // recent for destructive actions, regardless of elapsed time.
            "yesterday" | "recent" => {
                if let (Some(required), Some(rule)) = (min_age, SafetyRule::for_action(action)) {
                    return Err(SafetyViolation {
                        rule,
                        required_days: required,
                        requested_days: if expr == "yesterday" { 1 } else { 0 },
                        cutoff: None,
                    }
                    .into());
                }
                // SELECT: a plain lower-bound window.
                let window = if expr == "yesterday" { 1 } else { 7 };
                date_start = Some(format_log_timestamp(now - Duration::days(window)));
            }
            _ => {
                let caps = OLDER_THAN_RE.captures(&expr).ok_or_else(|| {
                    OperationError::Validation(format!("unrecognized date filter: {}", expr))
                })?;
                // The grammar accepts arbitrarily many digits; everything
                // past here must reject oversized counts as a typed error,
                // never overflow.
                let n: i64 = caps[1].parse().map_err(|_| count_out_of_range(&expr))?;
                let requested_days = n
                    .checked_mul(unit_days(&caps[2]))
                    .ok_or_else(|| count_out_of_range(&expr))?;
                let delta =
                    Duration::try_days(requested_days).ok_or_else(|| count_out_of_range(&expr))?;
                let derived_at = now
                    .checked_sub_signed(delta)
                    .ok_or_else(|| count_out_of_range(&expr))?;
                let derived = format_log_timestamp(derived_at);
                if !is_valid_log_timestamp(&derived) {
                    return Err(count_out_of_range(&expr));
                }

                if let (Some(required), Some(rule)) = (min_age, SafetyRule::for_action(action)) {
                    if requested_days < required {
                        return Err(SafetyViolation {
                            rule,
                            required_days: required,
                            requested_days,
                            cutoff: Some(derived),
                        }
                        .into());
                    }
                }

                cutoff = Some(derived);
                comparison = Some(DateComparison::OlderThan);
            }
        }
    } else if let Some(raw_end) = filters.date_end.as_deref() {
        if !is_valid_log_timestamp(raw_end) {
            return Err(OperationError::Validation(format!(
                "date_end is not a valid YYYYMMDDHHMMSS timestamp: {}",
                raw_end
            )));
        }
        // A raw cutoff carries no "older_than" origin, so the bound is
        // inclusive unless the caller said otherwise.
        let mode = filters.date_comparison.unwrap_or(DateComparison::AtOrBefore);

        if let (Some(required), Some(rule)) = (min_age, SafetyRule::for_action(action)) {
            let end_ts = parse_log_timestamp(raw_end)
                .ok_or_else(|| OperationError::Validation("unparseable date_end".into()))?;
            if end_ts > now - Duration::days(required) {
                let requested_days = (now - end_ts).num_days().max(0);
                return Err(SafetyViolation {
                    rule,
                    required_days: required,
                    requested_days,
                    cutoff: Some(raw_end.to_string()),
                }
                .into());
            }
        }

        cutoff = Some(raw_end.to_string());
        comparison = Some(mode);
    } else if let Some(required) = min_age {
        // No date constraint supplied at all: fall back to the action's
        // minimum age, re-validated trivially by construction.
        cutoff = Some(format_log_timestamp(now - Duration::days(required)));
        comparison = Some(DateComparison::OlderThan);
    }

    let mut resolved = filters.clone();
    resolved.date_start = date_start.clone();
    resolved.date_end = cutoff.clone();
    resolved.date_comparison = comparison;

    Ok(NormalizedFilters {
        cutoff,
        comparison,
        date_start,
        resolved,
    })
}

/// Extracts the first date expression from free text, using the same grammar
/// the normalizer accepts. Used by confirmation replay to re-derive filters
/// from the original triggering message.
pub fn extract_date_filter(message: &str) -> Option<String> {
    DATE_EXPR_RE
        .find(&message.to_lowercase())
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SafetyRule;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    fn with_date_filter(expr: &str) -> FilterSet {
        FilterSet {
            date_filter: Some(expr.into()),
            ..Default::default()
        }
    }

    fn expect_violation(result: Result<NormalizedFilters, OperationError>) -> SafetyViolation {
        match result {
            Err(OperationError::Safety(v)) => v,
            other => panic!("expected safety violation, got {:?}", other),
        }
    }

    #[test]
    fn test_archive_rejects_all_days_below_minimum() {
        for n in 0..7 {
            let v = expect_violation(normalize_at(
                &with_date_filter(&format!("older_than_{}_days", n)),
                OperationAction::Archive,
                at(),
            ));
            assert_eq!(v.rule, SafetyRule::ArchiveMinAge);
            assert_eq!(v.required_days, 7);
            assert_eq!(v.requested_days, n);
        }
    }

    #[test]
    fn test_delete_rejects_all_days_below_minimum() {
        for n in 0..30 {
            let v = expect_violation(normalize_at(
                &with_date_filter(&format!("older_than_{}_days", n)),
                OperationAction::Delete,
                at(),
            ));
            assert_eq!(v.rule, SafetyRule::DeleteMinAge);
            assert_eq!(v.required_days, 30);
            assert_eq!(v.requested_days, n);
        }
    }

    #[test]
    fn test_archive_at_minimum_passes() {
        let n = normalize_at(
            &with_date_filter("older_than_7_days"),
            OperationAction::Archive,
            at(),
        )
        .unwrap();
        assert_eq!(n.cutoff.as_deref(), Some("20260608120000"));
        assert_eq!(n.comparison, Some(DateComparison::OlderThan));
    }

    #[test]
    fn test_month_unit_is_thirty_days() {
        let n = normalize_at(
            &with_date_filter("older_than_2_months"),
            OperationAction::Delete,
            at(),
        )
        .unwrap();
        // 60 days before 2026-06-15 12:00:00.
        assert_eq!(n.cutoff.as_deref(), Some("20260416120000"));
    }

    #[test]
    fn test_year_unit_is_365_days() {
        let n = normalize_at(
            &with_date_filter("older_than_1_year"),
            OperationAction::Archive,
            at(),
        )
        .unwrap();
        assert_eq!(n.cutoff.as_deref(), Some("20250615120000"));
    }

    #[test]
    fn test_yesterday_and_recent_always_reject_destructive() {
        for expr in ["yesterday", "recent", "YESTERDAY", " Recent "] {
            let v = expect_violation(normalize_at(
                &with_date_filter(expr),
                OperationAction::Archive,
                at(),
            ));
            assert_eq!(v.rule, SafetyRule::ArchiveMinAge);

            let v = expect_violation(normalize_at(
                &with_date_filter(expr),
                OperationAction::Delete,
                at(),
            ));
            assert_eq!(v.rule, SafetyRule::DeleteMinAge);
        }
    }

    #[test]
    fn test_yesterday_is_a_window_for_select() {
        let n = normalize_at(
            &with_date_filter("yesterday"),
            OperationAction::Select,
            at(),
        )
        .unwrap();
        assert_eq!(n.cutoff, None);
        assert_eq!(n.date_start.as_deref(), Some("20260614120000"));
    }

    #[test]
    fn test_implicit_default_for_archive() {
        let n = normalize_at(&FilterSet::default(), OperationAction::Archive, at()).unwrap();
        assert_eq!(n.cutoff.as_deref(), Some("20260608120000"));
        assert_eq!(n.comparison, Some(DateComparison::OlderThan));
    }

    #[test]
    fn test_implicit_default_for_delete() {
        let n = normalize_at(&FilterSet::default(), OperationAction::Delete, at()).unwrap();
        assert_eq!(n.cutoff.as_deref(), Some("20260516120000"));
    }

    #[test]
    fn test_select_without_dates_has_no_cutoff() {
        let n = normalize_at(&FilterSet::default(), OperationAction::Select, at()).unwrap();
        assert_eq!(n.cutoff, None);
        assert_eq!(n.comparison, None);
    }

    #[test]
    fn test_raw_date_end_defaults_to_inclusive_comparison() {
        let filters = FilterSet {
            date_end: Some("20260101000000".into()),
            ..Default::default()
        };
        let n = normalize_at(&filters, OperationAction::Archive, at()).unwrap();
        assert_eq!(n.comparison, Some(DateComparison::AtOrBefore));
        assert_eq!(n.cutoff.as_deref(), Some("20260101000000"));
    }

    #[test]
    fn test_raw_date_end_too_recent_rejected() {
        let filters = FilterSet {
            date_end: Some("20260613000000".into()),
            ..Default::default()
        };
        let v = expect_violation(normalize_at(&filters, OperationAction::Archive, at()));
        assert_eq!(v.rule, SafetyRule::ArchiveMinAge);
        assert_eq!(v.required_days, 7);
        assert_eq!(v.requested_days, 2);
        assert_eq!(v.cutoff.as_deref(), Some("20260613000000"));
    }

    #[test]
    fn test_explicit_older_than_comparison_is_kept_on_raw_cutoff() {
        let filters = FilterSet {
            date_end: Some("20260101000000".into()),
            date_comparison: Some(DateComparison::OlderThan),
            ..Default::default()
        };
        let n = normalize_at(&filters, OperationAction::Archive, at()).unwrap();
        assert_eq!(n.comparison, Some(DateComparison::OlderThan));
    }

    #[test]
    fn test_malformed_expressions_are_validation_errors() {
        for expr in ["older_than_x_days", "last_week", "older_than_5_minutes"] {
            match normalize_at(&with_date_filter(expr), OperationAction::Archive, at()) {
                Err(OperationError::Validation(_)) => {}
                other => panic!("expected validation error for {:?}, got {:?}", expr, other),
            }
        }
    }

    #[test]
    fn test_oversized_older_than_counts_are_validation_errors() {
        // Counts the chrono range (or the char(14) format) cannot represent
        // must come back as typed errors, not panics.
        let cases = [
            "older_than_1000000000000_days",
            "older_than_99999999999999999999_days",
            "older_than_1000000_days",
            "older_than_10000000_years",
        ];
        for expr in cases {
            for action in [OperationAction::Archive, OperationAction::Delete] {
                match normalize_at(&with_date_filter(expr), action, at()) {
                    Err(OperationError::Validation(msg)) => {
                        assert!(msg.contains("out of range"), "unexpected message: {}", msg)
                    }
                    other => panic!("expected validation error for {:?}, got {:?}", expr, other),
                }
            }
        }
    }

    #[test]
    fn test_large_but_representable_count_still_normalizes() {
        // 100 years expressed in days stays within both chrono and the
        // char(14) format.
        let n = normalize_at(
            &with_date_filter("older_than_36500_days"),
            OperationAction::Delete,
            at(),
        )
        .unwrap();
        // 36500 days before 2026-06-15 crosses 25 leap days.
        assert_eq!(n.cutoff.as_deref(), Some("19260710120000"));
        assert_eq!(n.comparison, Some(DateComparison::OlderThan));
    }

    #[test]
    fn test_malformed_date_end_is_validation_error() {
        let filters = FilterSet {
            date_end: Some("2026-01-01".into()),
            ..Default::default()
        };
        assert!(matches!(
            normalize_at(&filters, OperationAction::Archive, at()),
            Err(OperationError::Validation(_))
        ));
    }

    #[test]
    fn test_resolved_filter_echo_carries_cutoff_and_mode() {
        let filters = FilterSet {
            date_filter: Some("older_than_10_days".into()),
            agent_name: Some("agent-a".into()),
            ..Default::default()
        };
        let n = normalize_at(&filters, OperationAction::Archive, at()).unwrap();
        assert_eq!(n.resolved.date_end, n.cutoff);
        assert_eq!(n.resolved.date_comparison, Some(DateComparison::OlderThan));
        assert_eq!(n.resolved.agent_name.as_deref(), Some("agent-a"));
    }

    #[test]
    fn test_extract_date_filter_from_free_text() {
        assert_eq!(
            extract_date_filter("please archive dsiactivities older_than_10_days now"),
            Some("older_than_10_days".to_string())
        );
        assert_eq!(
            extract_date_filter("Delete RECENT transaction logs"),
            Some("recent".to_string())
        );
        assert_eq!(extract_date_filter("archive everything"), None);
    }
}
