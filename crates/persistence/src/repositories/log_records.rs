//! Log record repository: previews, selects, and the transactional
//! archive/delete execution paths.
//!
//! Physical table names are always taken from the closed `LogTable` enum,
//! never from caller input, so the dynamic SQL here interpolates only
//! trusted identifiers; every value travels through a bind parameter.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use domain::models::{LogRecord, LogTable, OperationStatus, PREVIEW_SAMPLE_LIMIT};
use domain::services::NormalizedFilters;
use shared::pagination::PageQuery;

use crate::entities::LogRecordEntity;
use crate::metrics::QueryTimer;

/// Failures of the transactional execution paths. Database errors and the
/// internal rowcount cross-check are both unrecoverable here; the service
/// layer handles audit bookkeeping.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("archive rowcount mismatch: copied {archived} row(s) but matched {deleted} on delete")]
    RowCountMismatch { archived: u64, deleted: u64 },
}

/// Conjunctive WHERE-clause builder over normalized filters. Tracks bind
/// values alongside column/operator pairs so the same predicate can be
/// rendered at different parameter offsets (the archive insert binds actor
/// and reason ahead of the filter values).
#[derive(Debug, Clone)]
pub struct LogPredicate {
    conditions: Vec<(&'static str, &'static str)>,
    binds: Vec<String>,
}

impl LogPredicate {
    /// Build the predicate from a gate-normalized filter set.
    pub fn from_normalized(normalized: &NormalizedFilters) -> Self {
        let mut conditions = Vec::new();
        let mut binds = Vec::new();

        if let (Some(cutoff), Some(cmp)) = (&normalized.cutoff, normalized.comparison) {
            conditions.push(("logtimestamp", cmp.sql_operator()));
            binds.push(cutoff.clone());
        }
        if let Some(start) = &normalized.date_start {
            conditions.push(("logtimestamp", ">="));
            binds.push(start.clone());
        }
        for (column, value) in normalized.resolved.equality_pairs() {
            conditions.push((column, "="));
            binds.push(value.to_string());
        }

        Self { conditions, binds }
    }

    /// Renders the WHERE clause with parameters numbered from
    /// `first_param`. An empty predicate renders as `TRUE`.
    pub fn where_clause(&self, first_param: usize) -> String {
        if self.conditions.is_empty() {
            return "TRUE".to_string();
        }
        self.conditions
            .iter()
            .enumerate()
            .map(|(i, (column, op))| format!("{} {} ${}", column, op, first_param + i))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Bind values in condition order.
    pub fn binds(&self) -> &[String] {
        &self.binds
    }

    /// Number of bind parameters.
    pub fn param_count(&self) -> usize {
        self.binds.len()
    }
}

/// Binds a predicate's values onto any sqlx query builder.
macro_rules! bind_predicate {
    ($builder:expr, $predicate:expr) => {{
        let mut b = $builder;
        for value in $predicate.binds() {
            b = b.bind(value);
        }
        b
    }};
}

/// Repository for log-record reads and destructive operations.
#[derive(Clone)]
pub struct LogRecordRepository {
    pool: PgPool,
}

impl LogRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Non-mutating preview: exact count plus a bounded sample, oldest
    /// first. Safe to call repeatedly; takes no write lock.
    pub async fn preview(
        &self,
        table: &str,
        predicate: &LogPredicate,
    ) -> Result<(i64, Vec<LogRecord>), sqlx::Error> {
        let timer = QueryTimer::new("preview_count");
        let count_sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            table,
            predicate.where_clause(1)
        );
        let count_builder = sqlx::query_scalar::<_, i64>(&count_sql);
        let count: i64 = bind_predicate!(count_builder, predicate)
            .fetch_one(&self.pool)
            .await?;
        timer.record();

        if count == 0 {
            return Ok((0, Vec::new()));
        }

        let timer = QueryTimer::new("preview_sample");
        let sample_sql = format!(
            "SELECT id, logtimestamp, agent_name, server_name, user_id, device_id, detail \
             FROM {} WHERE {} ORDER BY logtimestamp ASC LIMIT {}",
            table,
            predicate.where_clause(1),
            PREVIEW_SAMPLE_LIMIT
        );
        let sample_builder = sqlx::query_as::<_, LogRecordEntity>(&sample_sql);
        let entities = bind_predicate!(sample_builder, predicate)
            .fetch_all(&self.pool)
            .await?;
        timer.record();

        Ok((count, entities.into_iter().map(entity_to_domain).collect()))
    }

    /// Paged read for plain select operations.
    pub async fn select_page(
        &self,
        table: &str,
        predicate: &LogPredicate,
        page: &PageQuery,
    ) -> Result<(i64, Vec<LogRecord>), sqlx::Error> {
        let timer = QueryTimer::new("select_page");
        let count_sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            table,
            predicate.where_clause(1)
        );
        let count_builder = sqlx::query_scalar::<_, i64>(&count_sql);
        let total: i64 = bind_predicate!(count_builder, predicate)
            .fetch_one(&self.pool)
            .await?;

        let next_param = predicate.param_count() + 1;
        let list_sql = format!(
            "SELECT id, logtimestamp, agent_name, server_name, user_id, device_id, detail \
             FROM {} WHERE {} ORDER BY logtimestamp DESC LIMIT ${} OFFSET ${}",
            table,
            predicate.where_clause(1),
            next_param,
            next_param + 1
        );
        let list_builder = sqlx::query_as::<_, LogRecordEntity>(&list_sql);
        let entities = bind_predicate!(list_builder, predicate)
            .bind(page.per_page() as i64)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        timer.record();

        Ok((total, entities.into_iter().map(entity_to_domain).collect()))
    }

    /// Archive execution: copy matching rows from the main table into the
    /// archive table, delete them from the main table with the identical
    /// predicate, and mark the audit entry successful — all inside one
    /// transaction. A failure at any step rolls the whole transaction back,
    /// so a crash can never leave rows duplicated-and-orphaned or deleted
    /// without an archive copy.
    pub async fn execute_archive(
        &self,
        table: LogTable,
        predicate: &LogPredicate,
        audit_id: Uuid,
        archived_by: &str,
        archive_reason: Option<&str>,
    ) -> Result<i64, ExecutionError> {
        let timer = QueryTimer::new("execute_archive");
        let mut tx = self.pool.begin().await?;

        // Actor and reason occupy $1/$2; predicate values follow.
        let insert_sql = format!(
            "INSERT INTO {} (logtimestamp, agent_name, server_name, user_id, device_id, detail, \
                             archived_at, archived_by, archive_reason) \
             SELECT logtimestamp, agent_name, server_name, user_id, device_id, detail, \
                    NOW(), $1, $2 \
             FROM {} WHERE {}",
            table.archive_table_name(),
            table.main_table_name(),
            predicate.where_clause(3)
        );
        let insert_builder = sqlx::query(&insert_sql).bind(archived_by).bind(archive_reason);
        let archived = bind_predicate!(insert_builder, predicate)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let delete_sql = format!(
            "DELETE FROM {} WHERE {}",
            table.main_table_name(),
            predicate.where_clause(1)
        );
        let delete_builder = sqlx::query(&delete_sql);
        let deleted = bind_predicate!(delete_builder, predicate)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if archived != deleted {
            // Dropping the transaction rolls everything back.
            return Err(ExecutionError::RowCountMismatch { archived, deleted });
        }

        mark_audit_success(&mut tx, audit_id, archived as i64).await?;
        tx.commit().await?;
        timer.record();

        Ok(archived as i64)
    }

    /// Delete execution against an archive table: one bulk delete plus the
    /// audit success update, in one transaction.
    pub async fn execute_purge(
        &self,
        table: LogTable,
        predicate: &LogPredicate,
        audit_id: Uuid,
    ) -> Result<i64, ExecutionError> {
        let timer = QueryTimer::new("execute_purge");
        let mut tx = self.pool.begin().await?;

        let delete_sql = format!(
            "DELETE FROM {} WHERE {}",
            table.archive_table_name(),
            predicate.where_clause(1)
        );
        let delete_builder = sqlx::query(&delete_sql);
        let deleted = bind_predicate!(delete_builder, predicate)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        mark_audit_success(&mut tx, audit_id, deleted as i64).await?;
        tx.commit().await?;
        timer.record();

        Ok(deleted as i64)
    }
}

/// Audit success transition, rides inside the caller's transaction.
async fn mark_audit_success(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    audit_id: Uuid,
    records_affected: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE operation_audit \
         SET status = $1, records_affected = $2, finished_at = NOW() \
         WHERE id = $3 AND status = $4",
    )
    .bind(OperationStatus::Success.to_string())
    .bind(records_affected)
    .bind(audit_id)
    .bind(OperationStatus::InProgress.to_string())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Convert entity to domain model.
fn entity_to_domain(entity: LogRecordEntity) -> LogRecord {
    LogRecord {
        id: entity.id,
        log_timestamp: entity.logtimestamp,
        agent_name: entity.agent_name,
        server_name: entity.server_name,
        user_id: entity.user_id,
        device_id: entity.device_id,
        detail: entity.detail,
    }
}
