//! Operation audit domain models.
//!
//! Every destructive operation is bracketed by an audit entry: created at
//! `in_progress` before any destructive SQL runs, transitioned exactly once
//! to `success` or `failed`, never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use uuid::Uuid;

use super::operation::OperationAction;

/// Lifecycle status of an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    InProgress,
    Success,
    Failed,
}

impl FromStr for OperationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_progress" => Ok(OperationStatus::InProgress),
            "success" => Ok(OperationStatus::Success),
            "failed" => Ok(OperationStatus::Failed),
            _ => Err(format!("Unknown operation status: {}", s)),
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::InProgress => write!(f, "in_progress"),
            OperationStatus::Success => write!(f, "success"),
            OperationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A persisted audit entry for one archive/delete operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationAudit {
    pub id: Uuid,
    pub operation_type: OperationAction,
    pub table_name: String,
    /// Actor identity supplied by the caller.
    pub user_id: String,
    pub date_range_start: Option<String>,
    pub date_range_end: Option<String>,
    pub status: OperationStatus,
    pub records_affected: Option<i64>,
    pub error_message: Option<String>,
    /// Free-form details: reason, filters, classifier confidence.
    pub operation_details: Option<JsonValue>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Input for creating the in-progress audit entry before execution.
#[derive(Debug, Clone)]
pub struct CreateOperationAuditInput {
    pub operation_type: OperationAction,
    pub table_name: String,
    pub user_id: String,
    pub date_range_start: Option<String>,
    pub date_range_end: Option<String>,
    pub operation_details: Option<JsonValue>,
}

/// Query filters for listing audit entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOperationAuditQuery {
    pub operation_type: Option<String>,
    pub table_name: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub page: Option<i32>,
    pub per_page: Option<i32>,
}
