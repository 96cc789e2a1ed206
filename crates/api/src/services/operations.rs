//! Operation orchestration: preview, confirmation replay, and audited
//! execution.
//!
//! This service glues the pure domain core to the repositories. Every
//! destructive path runs the safety gate immediately before execution,
//! regardless of whether the descriptor came from a fresh classification,
//! a structured API call, or a confirmation replay.

use std::sync::Arc;

use domain::models::{
    CreateOperationAuditInput, ExecutionResult, LogRecord, OperationAction, OperationDescriptor,
    PreviewResult,
};
use domain::services::{confirmation, safety_gate, NormalizedFilters, HISTORY_WINDOW};
use persistence::db::RegionPools;
use persistence::repositories::{
    AppendExchangeInput, ConversationRepository, LogPredicate, LogRecordRepository,
    OperationAuditRepository,
};
use shared::pagination::PageQuery;
use shared::validation::{validate_actor, validate_reason, validate_session_id};

use crate::error::ApiError;
use crate::services::classifier::{descriptor_from_intent, ClassifierError, IntentClassifier};

/// Reply from the chat surface: display text plus whichever structured
/// outcome the turn produced.
#[derive(Debug, serde::Serialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionResult>,
    pub cancelled: bool,
}

impl ChatReply {
    fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            preview: None,
            execution: None,
            cancelled: false,
        }
    }
}

/// Orchestrates operations against a region-selected pool.
#[derive(Clone)]
pub struct OperationService {
    pools: Arc<RegionPools>,
}

impl OperationService {
    pub fn new(pools: Arc<RegionPools>) -> Self {
        Self { pools }
    }

    /// Non-mutating preview of a destructive operation. Runs the safety
    /// gate first, so a preview can never be produced for an operation
    /// that would be rejected at execution time.
    pub async fn preview(
        &self,
        region: Option<&str>,
        descriptor: &OperationDescriptor,
    ) -> Result<PreviewResult, ApiError> {
        if descriptor.action == OperationAction::Select {
            return Err(ApiError::Validation(
                "select operations are read-only; use the query endpoint".into(),
            ));
        }
        let normalized = safety_gate::validate(descriptor)?;
        let pool = self.pools.pool(region)?;
        let repo = LogRecordRepository::new(pool.clone());

        let predicate = LogPredicate::from_normalized(&normalized);
        let (count, samples) = repo
            .preview(descriptor.target_table_name(), &predicate)
            .await?;

        Ok(PreviewResult::new(
            descriptor.action,
            descriptor.target_table_name(),
            count,
            samples,
            normalized.resolved,
        ))
    }

    /// Paged read for plain select operations.
    pub async fn select(
        &self,
        region: Option<&str>,
        descriptor: &OperationDescriptor,
        page: &PageQuery,
    ) -> Result<(i64, Vec<LogRecord>), ApiError> {
        let normalized = safety_gate::validate(descriptor)?;
        let pool = self.pools.pool(region)?;
        let repo = LogRecordRepository::new(pool.clone());
        let predicate = LogPredicate::from_normalized(&normalized);
        let (total, rows) = repo
            .select_page(descriptor.target_table_name(), &predicate, page)
            .await?;
        Ok((total, rows))
    }

    /// Audited execution of an archive or delete. The audit entry is
    /// committed at in_progress before any destructive SQL; the success
    /// transition rides inside the destructive transaction; a failure is
    /// recorded by a best-effort follow-up write whose own failure is
    /// swallowed so it cannot mask the original error.
    pub async fn execute(
        &self,
        region: Option<&str>,
        descriptor: &OperationDescriptor,
        actor: &str,
        reason: Option<&str>,
    ) -> Result<ExecutionResult, ApiError> {
        validate_actor(actor)?;
        if let Some(reason) = reason {
            validate_reason(reason)?;
        }

        // The gate runs here, immediately before execution, on every path.
        let normalized = safety_gate::validate(descriptor)?;
        let pool = self.pools.pool(region)?;
        let log_repo = LogRecordRepository::new(pool.clone());
        let audit_repo = OperationAuditRepository::new(pool.clone());

        let predicate = LogPredicate::from_normalized(&normalized);
        let audit_id = audit_repo
            .insert_in_progress(&audit_input(descriptor, &normalized, actor, reason))
            .await?;

        let outcome = match descriptor.action {
            OperationAction::Archive => log_repo
                .execute_archive(descriptor.table, &predicate, audit_id, actor, reason)
                .await
                .map(|count| {
                    ExecutionResult::archived(descriptor.target_table_name(), count, audit_id)
                }),
            OperationAction::Delete => log_repo
                .execute_purge(descriptor.table, &predicate, audit_id)
                .await
                .map(|count| {
                    ExecutionResult::deleted(descriptor.target_table_name(), count, audit_id)
                }),
            OperationAction::Select => {
                return Err(ApiError::Validation(
                    "select operations are not executable".into(),
                ))
            }
        };

        match outcome {
            Ok(result) => {
                tracing::info!(
                    audit_id = %audit_id,
                    table = result.table,
                    action = %descriptor.action,
                    records = result.records_archived.or(result.records_deleted),
                    "operation executed"
                );
                Ok(result)
            }
            Err(err) => {
                tracing::error!(audit_id = %audit_id, error = %err, "operation failed; rolling back");
                if let Err(audit_err) = audit_repo.mark_failed(audit_id, &err.to_string()).await {
                    tracing::error!(
                        audit_id = %audit_id,
                        error = %audit_err,
                        "failed to record operation failure in audit log"
                    );
                }
                Err(err.into())
            }
        }
    }

    /// One turn of the chat surface: either a confirmation signal resolved
    /// against session history, or a fresh message sent through the
    /// classifier.
    pub async fn handle_chat(
        &self,
        region: Option<&str>,
        session_id: &str,
        message: &str,
        actor: &str,
        classifier: Option<&dyn IntentClassifier>,
    ) -> Result<ChatReply, ApiError> {
        validate_session_id(session_id)?;
        validate_actor(actor)?;

        let pool = self.pools.pool(region)?;
        let conversation = ConversationRepository::new(pool.clone());

        if let Some(signal) = confirmation::detect_signal(message) {
            let history = conversation.recent(session_id, HISTORY_WINDOW as i64).await?;
            return match confirmation::resolve(signal, &history)? {
                confirmation::Resolution::Cancelled => {
                    let reply = ChatReply {
                        cancelled: true,
                        ..ChatReply::text("Operation cancelled. Nothing was changed.")
                    };
                    self.record_exchange(&conversation, session_id, message, &reply.response, None, None)
                        .await;
                    Ok(reply)
                }
                confirmation::Resolution::Execute(descriptor) => {
                    let execution = self.execute(region, &descriptor, actor, None).await?;
                    let response = execution.message.clone();
                    self.record_exchange(
                        &conversation,
                        session_id,
                        message,
                        &response,
                        Some(descriptor.table.main_table_name()),
                        Some(descriptor.action),
                    )
                    .await;
                    Ok(ChatReply {
                        execution: Some(execution),
                        ..ChatReply::text(response)
                    })
                }
            };
        }

        let classifier = classifier.ok_or_else(|| {
            ApiError::ServiceUnavailable("intent classifier is not configured".into())
        })?;
        let intent = classifier.classify(message).await.map_err(|e| match e {
            ClassifierError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
            ClassifierError::Rejected(msg) => ApiError::Validation(msg),
        })?;
        let descriptor =
            descriptor_from_intent(&intent).map_err(|e| ApiError::Validation(e.to_string()))?;

        let reply = match descriptor.action {
            OperationAction::Select => {
                let (total, _rows) = self
                    .select(region, &descriptor, &PageQuery::default())
                    .await?;
                ChatReply::text(format!(
                    "Found {} record(s) in {}.",
                    total,
                    descriptor.target_table_name()
                ))
            }
            OperationAction::Archive | OperationAction::Delete => {
                let preview = self.preview(region, &descriptor).await?;
                if !preview.requires_confirmation {
                    // Zero-row previews are terminal: no marker is emitted,
                    // so no later confirmation can replay this request.
                    ChatReply::text(format!(
                        "No records in {} match the requested filters; nothing to do.",
                        preview.table
                    ))
                } else {
                    let response = preview_response(&preview);
                    ChatReply {
                        preview: Some(preview),
                        ..ChatReply::text(response)
                    }
                }
            }
        };

        self.record_exchange(
            &conversation,
            session_id,
            message,
            &reply.response,
            Some(descriptor.table.main_table_name()),
            Some(descriptor.action),
        )
        .await;

        Ok(reply)
    }

    /// Conversation-log append. Best-effort: a failed write degrades
    /// confirmation replay for this turn but must not fail the request.
    async fn record_exchange(
        &self,
        conversation: &ConversationRepository,
        session_id: &str,
        user_message: &str,
        bot_response: &str,
        table_name: Option<&str>,
        operation_type: Option<OperationAction>,
    ) {
        let input = AppendExchangeInput {
            session_id: session_id.to_string(),
            user_message: user_message.to_string(),
            bot_response: bot_response.to_string(),
            table_name: table_name.map(String::from),
            operation_type: operation_type.map(|a| a.to_string()),
        };
        if let Err(err) = conversation.append(&input).await {
            tracing::error!(session_id, error = %err, "failed to record chat exchange");
        }
    }
}

/// Display text for a pending preview, carrying the marker the
/// confirmation resolver scans for.
fn preview_response(preview: &PreviewResult) -> String {
    let (marker, token) = match preview.action {
        OperationAction::Archive => ("Archive Preview", "CONFIRM ARCHIVE"),
        OperationAction::Delete => ("Delete Preview", "CONFIRM DELETE"),
        OperationAction::Select => unreachable!("previews are destructive-only"),
    };
    let cutoff = preview
        .filters_applied
        .date_end
        .as_deref()
        .unwrap_or("none");
    format!(
        "{}: {} matching record(s) in {} (cutoff {}). Reply {} to proceed or CANCEL to abort.",
        marker, preview.matched_count, preview.table, cutoff, token
    )
}

fn audit_input(
    descriptor: &OperationDescriptor,
    normalized: &NormalizedFilters,
    actor: &str,
    reason: Option<&str>,
) -> CreateOperationAuditInput {
    CreateOperationAuditInput {
        operation_type: descriptor.action,
        table_name: descriptor.target_table_name().to_string(),
        user_id: actor.to_string(),
        date_range_start: normalized.date_start.clone(),
        date_range_end: normalized.cutoff.clone(),
        operation_details: Some(serde_json::json!({
            "reason": reason,
            "filters": normalized.resolved,
            "confidence": descriptor.confidence,
            "confirmed": descriptor.confirmed,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::FilterSet;

    #[test]
    fn test_preview_response_carries_marker_and_token() {
        let preview = PreviewResult::new(
            OperationAction::Archive,
            "dsiactivities",
            12,
            vec![],
            FilterSet {
                date_end: Some("20260605120000".into()),
                ..Default::default()
            },
        );
        let text = preview_response(&preview);
        assert!(text.contains("Archive Preview"));
        assert!(text.contains("CONFIRM ARCHIVE"));
        assert!(text.contains("12"));
        assert!(text.contains("20260605120000"));
    }

    #[test]
    fn test_delete_preview_response_uses_delete_marker() {
        let preview = PreviewResult::new(
            OperationAction::Delete,
            "dsiactivities_archive",
            4,
            vec![],
            FilterSet::default(),
        );
        let text = preview_response(&preview);
        assert!(text.contains("Delete Preview"));
        assert!(text.contains("CONFIRM DELETE"));
    }
}
