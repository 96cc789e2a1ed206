//! Execution results for archive/delete operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::operation::OperationAction;

/// Outcome of a completed archive or delete transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub action: OperationAction,
    /// Physical table the operation mutated.
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_archived: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_deleted: Option<i64>,
    /// Identifier of the audit entry bracketing this operation.
    pub audit_id: Uuid,
    pub message: String,
}

impl ExecutionResult {
    /// A successful archive outcome: rows copied to the archive table and
    /// removed from the main table.
    pub fn archived(table: impl Into<String>, count: i64, audit_id: Uuid) -> Self {
        let table = table.into();
        let message = format!("Archived {} record(s) from {}", count, table);
        Self {
            success: true,
            action: OperationAction::Archive,
            table,
            records_archived: Some(count),
            records_deleted: None,
            audit_id,
            message,
        }
    }

    /// A successful delete outcome against an archive table.
    pub fn deleted(table: impl Into<String>, count: i64, audit_id: Uuid) -> Self {
        let table = table.into();
        let message = format!("Deleted {} record(s) from {}", count, table);
        Self {
            success: true,
            action: OperationAction::Delete,
            table,
            records_archived: None,
            records_deleted: Some(count),
            audit_id,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archived_result_counts() {
        let id = Uuid::new_v4();
        let r = ExecutionResult::archived("dsiactivities", 42, id);
        assert!(r.success);
        assert_eq!(r.records_archived, Some(42));
        assert_eq!(r.records_deleted, None);
        assert!(r.message.contains("42"));
    }

    #[test]
    fn test_deleted_result_counts() {
        let id = Uuid::new_v4();
        let r = ExecutionResult::deleted("dsiactivities_archive", 7, id);
        assert_eq!(r.records_deleted, Some(7));
        assert_eq!(r.records_archived, None);
        assert_eq!(r.audit_id, id);
    }
}
