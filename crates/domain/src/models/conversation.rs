//! Conversation state consumed by the confirmation resolver.
//!
//! The chat log is owned by the surrounding service; this core only reads a
//! bounded window of recent exchanges to replay a previously previewed
//! operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker embedded in archive-preview bot responses.
pub const ARCHIVE_PREVIEW_MARKER: &str = "Archive Preview";

/// Marker embedded in delete-preview bot responses.
pub const DELETE_PREVIEW_MARKER: &str = "Delete Preview";

/// One stored exchange of a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationExchange {
    pub user_message: String,
    pub bot_response: String,
    /// Logical table tag stored when the exchange previewed an operation.
    pub table_name: Option<String>,
    /// Operation tag ("archive", "delete", "select") stored alongside.
    pub operation_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ConversationExchange {
    /// True when this exchange's bot response carries the given preview
    /// marker and a stored table tag, making it replayable.
    pub fn is_replayable_preview(&self, marker: &str) -> bool {
        self.table_name.is_some() && self.bot_response.contains(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(bot_response: &str, table_name: Option<&str>) -> ConversationExchange {
        ConversationExchange {
            user_message: "archive dsiactivities older_than_10_days".into(),
            bot_response: bot_response.into(),
            table_name: table_name.map(String::from),
            operation_type: Some("archive".into()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_replayable_requires_marker_and_table() {
        assert!(exchange("Archive Preview: 12 rows", Some("dsiactivities"))
            .is_replayable_preview(ARCHIVE_PREVIEW_MARKER));
        assert!(!exchange("Archive Preview: 12 rows", None)
            .is_replayable_preview(ARCHIVE_PREVIEW_MARKER));
        assert!(!exchange("Here are your records", Some("dsiactivities"))
            .is_replayable_preview(ARCHIVE_PREVIEW_MARKER));
    }
}
