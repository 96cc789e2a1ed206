//! Log record entities (database row mappings).

use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Row of a main log table (`dsiactivities`, `dsitransactionlog`). Archive
/// tables share these columns, so previews and selects against either kind
/// of table map through the same entity; the archival stamp columns are
/// write-only from this service's point of view.
#[derive(Debug, Clone, FromRow)]
pub struct LogRecordEntity {
    pub id: i64,
    /// char(14) `YYYYMMDDHHMMSS` timestamp, the platform's native format.
    pub logtimestamp: String,
    pub agent_name: Option<String>,
    pub server_name: Option<String>,
    pub user_id: Option<String>,
    pub device_id: Option<String>,
    pub detail: Option<JsonValue>,
}
