//! Domain error types.
//!
//! Expected rule violations are typed, recoverable values the caller must
//! branch on. Infrastructure failures (database connectivity, transaction
//! errors) travel on a separate channel and never masquerade as rule
//! violations.

use serde::Serialize;
use thiserror::Error;

use crate::models::OperationAction;

/// Which minimum-age rule rejected an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyRule {
    ArchiveMinAge,
    DeleteMinAge,
}

impl SafetyRule {
    /// Machine-checkable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            SafetyRule::ArchiveMinAge => "archive_min_age",
            SafetyRule::DeleteMinAge => "delete_min_age",
        }
    }

    /// The rule that applies to a destructive action, if any.
    pub fn for_action(action: OperationAction) -> Option<Self> {
        match action {
            OperationAction::Archive => Some(SafetyRule::ArchiveMinAge),
            OperationAction::Delete => Some(SafetyRule::DeleteMinAge),
            OperationAction::Select => None,
        }
    }
}

impl std::fmt::Display for SafetyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A destructive operation's effective cutoff violates the minimum-age rule
/// for its action. Recoverable: the caller can widen the filter.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error(
    "{rule}: records must be at least {required_days} days old \
     (requested {requested_days} days)"
)]
pub struct SafetyViolation {
    pub rule: SafetyRule,
    pub required_days: i64,
    pub requested_days: i64,
    /// The computed cutoff, when one was derived before the rule fired.
    pub cutoff: Option<String>,
}

/// A confirmation signal could not be unambiguously tied to a prior preview.
/// Fails closed: the caller must restart the operation naming the table.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error(
    "no pending {operation} preview found in this session; \
     start a new operation and name the table explicitly"
)]
pub struct ResolutionFailure {
    pub operation: OperationAction,
}

impl ResolutionFailure {
    /// Machine-checkable reason code.
    pub fn code(&self) -> &'static str {
        "no_pending_operation"
    }
}

/// Recoverable domain failures produced by the safety and confirmation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError {
    #[error(transparent)]
    Safety(#[from] SafetyViolation),

    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    #[error("validation error: {0}")]
    Validation(String),
}

impl OperationError {
    /// Machine-checkable reason code for API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            OperationError::Safety(v) => v.rule.code(),
            OperationError::Resolution(r) => r.code(),
            OperationError::Validation(_) => "validation_error",
        }
    }
}
