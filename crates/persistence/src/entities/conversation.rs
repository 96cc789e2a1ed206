//! Conversation log entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the `conversation_log` table: one exchange of a chat session.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationExchangeEntity {
    pub id: i64,
    pub session_id: String,
    pub user_message: String,
    pub bot_response: String,
    pub table_name: Option<String>,
    pub operation_type: Option<String>,
    pub created_at: DateTime<Utc>,
}
