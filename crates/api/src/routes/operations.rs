//! Structured operation endpoints: preview, execute, and the read-only
//! query path.
//!
//! These accept explicit action/table/filter fields rather than natural
//! language, but run through the same descriptor, gate, and audit
//! machinery as the chat surface. Execution requires `confirmed: true`;
//! a caller that has not previewed cannot set it by accident without
//! asserting they intend the destructive outcome.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use domain::models::{
    ExecutionResult, FilterSet, LogRecord, LogTable, OperationAction, OperationDescriptor,
    PreviewResult,
};
use shared::pagination::{PageInfo, PageQuery};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct OperationRequest {
    pub action: String,
    pub table: String,
    #[serde(default)]
    pub filters: FilterSet,
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    #[serde(flatten)]
    pub operation: OperationRequest,
    pub actor: String,
    pub reason: Option<String>,
    /// Must be true. Execution is the second phase of preview/confirm.
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub table: String,
    #[serde(default)]
    pub filters: FilterSet,
    pub region: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub records: Vec<LogRecord>,
    pub pagination: PageInfo,
}

fn build_descriptor(request: &OperationRequest) -> Result<OperationDescriptor, ApiError> {
    let action = OperationAction::from_str(&request.action).map_err(ApiError::Validation)?;
    let table = LogTable::from_str(&request.table).map_err(ApiError::Validation)?;
    let descriptor = match action {
        OperationAction::Select => OperationDescriptor::select(table, request.filters.clone()),
        OperationAction::Archive => OperationDescriptor::archive(table, request.filters.clone()),
        OperationAction::Delete => {
            OperationDescriptor::delete_archived(table, request.filters.clone())
        }
    };
    Ok(descriptor)
}

/// POST /api/v1/operations/preview
pub async fn preview(
    State(state): State<AppState>,
    Json(request): Json<OperationRequest>,
) -> Result<Json<PreviewResult>, ApiError> {
    let descriptor = build_descriptor(&request)?;
    let result = state
        .operations
        .preview(request.region.as_deref(), &descriptor)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/operations/execute
pub async fn execute(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecutionResult>, ApiError> {
    if !request.confirmed {
        return Err(ApiError::Validation(
            "execution requires confirmed: true; preview the operation first".into(),
        ));
    }
    let descriptor = build_descriptor(&request.operation)?.confirmed();
    let result = state
        .operations
        .execute(
            request.operation.region.as_deref(),
            &descriptor,
            &request.actor,
            request.reason.as_deref(),
        )
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/logs/query
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let table = LogTable::from_str(&request.table).map_err(ApiError::Validation)?;
    let descriptor = OperationDescriptor::select(table, request.filters.clone());
    let (total, records) = state
        .operations
        .select(request.region.as_deref(), &descriptor, &request.page)
        .await?;
    Ok(Json(QueryResponse {
        records,
        pagination: PageInfo::new(&request.page, total),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_descriptor_for_delete_targets_archive() {
        let request = OperationRequest {
            action: "delete".into(),
            table: "dsiactivities".into(),
            filters: FilterSet::default(),
            region: None,
        };
        let descriptor = build_descriptor(&request).unwrap();
        assert!(descriptor.is_archive_target);
        assert_eq!(descriptor.target_table_name(), "dsiactivities_archive");
    }

    #[test]
    fn test_build_descriptor_rejects_unknown_table() {
        let request = OperationRequest {
            action: "archive".into(),
            table: "users".into(),
            filters: FilterSet::default(),
            region: None,
        };
        assert!(matches!(
            build_descriptor(&request),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_execute_request_defaults_unconfirmed() {
        let request: ExecuteRequest = serde_json::from_str(
            r#"{"action": "archive", "table": "dsiactivities", "actor": "ops"}"#,
        )
        .unwrap();
        assert!(!request.confirmed);
    }
}
