//! Operation audit entity.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `operation_audit` table. Append-only except for the single
/// in_progress → success/failed transition per entry.
#[derive(Debug, Clone, FromRow)]
pub struct OperationAuditEntity {
    pub id: Uuid,
    pub operation_type: String,
    pub table_name: String,
    pub user_id: String,
    pub date_range_start: Option<String>,
    pub date_range_end: Option<String>,
    pub status: String,
    pub records_affected: Option<i64>,
    pub error_message: Option<String>,
    pub operation_details: Option<JsonValue>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
