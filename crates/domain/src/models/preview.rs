//! Preview results for destructive operations.

use serde::{Deserialize, Serialize};

use super::log_record::LogRecord;
use super::operation::{FilterSet, OperationAction};

/// Maximum number of sample rows included in a preview.
pub const PREVIEW_SAMPLE_LIMIT: i64 = 5;

/// Non-committing preview of an operation: exact count plus a bounded
/// sample. Ephemeral; its defining fields are persisted only through the
/// conversation log entry that reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResult {
    pub action: OperationAction,
    /// Physical table the preview ran against.
    pub table: String,
    /// Exact count of rows matching the filters at preview time.
    pub matched_count: i64,
    /// Bounded sample of matching rows.
    pub sample_rows: Vec<LogRecord>,
    /// True iff at least one row matched. Zero-row previews are terminal.
    pub requires_confirmation: bool,
    /// Echo of the resolved filters the preview applied.
    pub filters_applied: FilterSet,
}

impl PreviewResult {
    pub fn new(
        action: OperationAction,
        table: impl Into<String>,
        matched_count: i64,
        sample_rows: Vec<LogRecord>,
        filters_applied: FilterSet,
    ) -> Self {
        Self {
            action,
            table: table.into(),
            matched_count,
            sample_rows,
            requires_confirmation: matched_count > 0,
            filters_applied,
        }
    }
}
