//! Inventory log record domain model.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A single inventory log record as presented to callers (preview samples,
/// select results).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: i64,
    /// char(14) log timestamp (`YYYYMMDDHHMMSS`).
    pub log_timestamp: String,
    pub agent_name: Option<String>,
    pub server_name: Option<String>,
    pub user_id: Option<String>,
    pub device_id: Option<String>,
    pub detail: Option<JsonValue>,
}
