//! Conversation log repository.
//!
//! The chat log is the durable side of the two-phase protocol: preview
//! exchanges carry table and operation tags that a later confirmation
//! resolves against.

use sqlx::PgPool;

use domain::models::ConversationExchange;

use crate::entities::ConversationExchangeEntity;
use crate::metrics::QueryTimer;

/// Input for appending one exchange to a session.
#[derive(Debug, Clone)]
pub struct AppendExchangeInput {
    pub session_id: String,
    pub user_message: String,
    pub bot_response: String,
    pub table_name: Option<String>,
    pub operation_type: Option<String>,
}

/// Repository for conversation exchanges.
#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends one exchange to the session log.
    pub async fn append(&self, input: &AppendExchangeInput) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("conversation_append");
        sqlx::query(
            "INSERT INTO conversation_log \
                 (session_id, user_message, bot_response, table_name, operation_type) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&input.session_id)
        .bind(&input.user_message)
        .bind(&input.bot_response)
        .bind(&input.table_name)
        .bind(&input.operation_type)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Recent exchanges for a session, most recent first, bounded.
    pub async fn recent(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<ConversationExchange>, sqlx::Error> {
        let timer = QueryTimer::new("conversation_recent");
        let entities = sqlx::query_as::<_, ConversationExchangeEntity>(
            "SELECT id, session_id, user_message, bot_response, table_name, \
                    operation_type, created_at \
             FROM conversation_log \
             WHERE session_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2",
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(entities.into_iter().map(entity_to_domain).collect())
    }
}

/// Convert entity to domain model.
fn entity_to_domain(entity: ConversationExchangeEntity) -> ConversationExchange {
    ConversationExchange {
        user_message: entity.user_message,
        bot_response: entity.bot_response,
        table_name: entity.table_name,
        operation_type: entity.operation_type,
        created_at: entity.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_entity_to_domain_keeps_tags() {
        let entity = ConversationExchangeEntity {
            id: 7,
            session_id: "session-1".into(),
            user_message: "archive dsiactivities older_than_10_days".into(),
            bot_response: "Archive Preview: 12 matching record(s)".into(),
            table_name: Some("dsiactivities".into()),
            operation_type: Some("archive".into()),
            created_at: Utc::now(),
        };
        let exchange = entity_to_domain(entity);
        assert_eq!(exchange.table_name.as_deref(), Some("dsiactivities"));
        assert_eq!(exchange.operation_type.as_deref(), Some("archive"));
    }
}
