//! Operation audit repository.
//!
//! The in-progress entry is committed on its own connection before the
//! destructive transaction begins, so a rollback can never erase the
//! evidence that an execution was attempted. The success transition rides
//! inside the destructive transaction (see `log_records`); the failed
//! transition is a separate best-effort write.

use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use domain::models::{
    CreateOperationAuditInput, ListOperationAuditQuery, OperationAction, OperationAudit,
    OperationStatus,
};
use shared::pagination::PageQuery;

use crate::entities::OperationAuditEntity;
use crate::metrics::QueryTimer;

/// Helper struct for building dynamic WHERE clauses from audit filters.
struct AuditFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl AuditFilterBuilder {
    fn build(query: &ListOperationAuditQuery) -> Self {
        let mut conditions = Vec::new();
        let mut param_count = 0;

        if query.operation_type.is_some() {
            param_count += 1;
            conditions.push(format!("operation_type = ${}", param_count));
        }
        if query.table_name.is_some() {
            param_count += 1;
            conditions.push(format!("table_name = ${}", param_count));
        }
        if query.user_id.is_some() {
            param_count += 1;
            conditions.push(format!("user_id = ${}", param_count));
        }
        if query.status.is_some() {
            param_count += 1;
            conditions.push(format!("status = ${}", param_count));
        }

        Self {
            conditions,
            param_count,
        }
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    fn param_count(&self) -> i32 {
        self.param_count
    }
}

/// Macro to bind audit query filters to a SQLx builder, avoiding
/// duplication between the count and list queries.
macro_rules! bind_audit_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref operation_type) = $query.operation_type {
            b = b.bind(operation_type);
        }
        if let Some(ref table_name) = $query.table_name {
            b = b.bind(table_name);
        }
        if let Some(ref user_id) = $query.user_id {
            b = b.bind(user_id);
        }
        if let Some(ref status) = $query.status {
            b = b.bind(status);
        }
        b
    }};
}

const AUDIT_COLUMNS: &str = "id, operation_type, table_name, user_id, date_range_start, \
     date_range_end, status, records_affected, error_message, operation_details, \
     started_at, finished_at";

/// Repository for operation audit entries.
#[derive(Clone)]
pub struct OperationAuditRepository {
    pool: PgPool,
}

impl OperationAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the in-progress entry and returns its id. This commits
    /// immediately, before any destructive SQL runs.
    pub async fn insert_in_progress(
        &self,
        input: &CreateOperationAuditInput,
    ) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("audit_insert_in_progress");
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO operation_audit (operation_type, table_name, user_id, \
                 date_range_start, date_range_end, status, operation_details) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id",
        )
        .bind(input.operation_type.to_string())
        .bind(&input.table_name)
        .bind(&input.user_id)
        .bind(&input.date_range_start)
        .bind(&input.date_range_end)
        .bind(OperationStatus::InProgress.to_string())
        .bind(&input.operation_details)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(id)
    }

    /// Marks an entry failed with the underlying error text. Best-effort:
    /// callers log but do not propagate a failure of this write, since
    /// failing to log a failure must not mask the original failure.
    pub async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE operation_audit \
             SET status = $1, error_message = $2, finished_at = NOW() \
             WHERE id = $3 AND status = $4",
        )
        .bind(OperationStatus::Failed.to_string())
        .bind(error_message)
        .bind(id)
        .bind(OperationStatus::InProgress.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Finds one audit entry by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<OperationAudit>, sqlx::Error> {
        let entity = sqlx::query_as::<_, OperationAuditEntity>(&format!(
            "SELECT {} FROM operation_audit WHERE id = $1",
            AUDIT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(entity_to_domain))
    }

    /// Lists audit entries with filtering and pagination, newest first.
    pub async fn list(
        &self,
        query: &ListOperationAuditQuery,
    ) -> Result<(Vec<OperationAudit>, i64), sqlx::Error> {
        let page = PageQuery {
            page: query.page,
            per_page: query.per_page,
        };

        let filter = AuditFilterBuilder::build(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_sql = format!("SELECT COUNT(*) FROM operation_audit WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_sql);
        let total: i64 = bind_audit_filters!(count_builder, query)
            .fetch_one(&self.pool)
            .await?;

        let list_sql = format!(
            "SELECT {} FROM operation_audit WHERE {} \
             ORDER BY started_at DESC LIMIT ${} OFFSET ${}",
            AUDIT_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, OperationAuditEntity>(&list_sql);
        let entities = bind_audit_filters!(list_builder, query)
            .bind(page.per_page() as i64)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((entities.into_iter().map(entity_to_domain).collect(), total))
    }
}

/// Convert entity to domain model.
fn entity_to_domain(entity: OperationAuditEntity) -> OperationAudit {
    let operation_type = OperationAction::from_str(&entity.operation_type)
        .unwrap_or(OperationAction::Select);
    let status =
        OperationStatus::from_str(&entity.status).unwrap_or(OperationStatus::Failed);

    OperationAudit {
        id: entity.id,
        operation_type,
        table_name: entity.table_name,
        user_id: entity.user_id,
        date_range_start: entity.date_range_start,
        date_range_end: entity.date_range_end,
        status,
        records_affected: entity.records_affected,
        error_message: entity.error_message,
        operation_details: entity.operation_details,
        started_at: entity.started_at,
        finished_at: entity.finished_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_filter_builder_empty_query() {
        let filter = AuditFilterBuilder::build(&ListOperationAuditQuery::default());
        assert_eq!(filter.where_clause(), "TRUE");
        assert_eq!(filter.param_count(), 0);
    }

    #[test]
    fn test_filter_builder_tracks_positions() {
        let query = ListOperationAuditQuery {
            table_name: Some("dsiactivities".into()),
            status: Some("success".into()),
            ..Default::default()
        };
        let filter = AuditFilterBuilder::build(&query);
        assert_eq!(filter.where_clause(), "table_name = $1 AND status = $2");
        assert_eq!(filter.param_count(), 2);
    }

    #[test]
    fn test_entity_to_domain_conversion() {
        let entity = OperationAuditEntity {
            id: Uuid::new_v4(),
            operation_type: "archive".into(),
            table_name: "dsiactivities".into(),
            user_id: "ops@example.com".into(),
            date_range_start: None,
            date_range_end: Some("20260605120000".into()),
            status: "success".into(),
            records_affected: Some(12),
            error_message: None,
            operation_details: Some(serde_json::json!({"reason": "quarterly cleanup"})),
            started_at: Utc::now(),
            finished_at: Some(Utc::now()),
        };

        let audit = entity_to_domain(entity);
        assert_eq!(audit.operation_type, OperationAction::Archive);
        assert_eq!(audit.status, OperationStatus::Success);
        assert_eq!(audit.records_affected, Some(12));
    }
}
