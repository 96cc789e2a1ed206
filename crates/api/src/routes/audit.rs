//! Audit trail endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain::models::{ListOperationAuditQuery, OperationAudit};
use persistence::repositories::OperationAuditRepository;
use shared::pagination::{PageInfo, PageQuery};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct AuditListParams {
    pub operation_type: Option<String>,
    pub table_name: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub region: Option<String>,
}

impl AuditListParams {
    fn to_query(&self) -> ListOperationAuditQuery {
        ListOperationAuditQuery {
            operation_type: self.operation_type.clone(),
            table_name: self.table_name.clone(),
            user_id: self.user_id.clone(),
            status: self.status.clone(),
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub entries: Vec<OperationAudit>,
    pub pagination: PageInfo,
}

/// GET /api/v1/audit
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<AuditListParams>,
) -> Result<Json<AuditListResponse>, ApiError> {
    let pool = state.pools.pool(params.region.as_deref())?;
    let repo = OperationAuditRepository::new(pool.clone());
    let query = params.to_query();
    let (entries, total) = repo.list(&query).await?;

    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    Ok(Json(AuditListResponse {
        entries,
        pagination: PageInfo::new(&page, total),
    }))
}

#[derive(Debug, Deserialize)]
pub struct AuditGetParams {
    pub region: Option<String>,
}

/// GET /api/v1/audit/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<AuditGetParams>,
) -> Result<Json<OperationAudit>, ApiError> {
    let pool = state.pools.pool(params.region.as_deref())?;
    let repo = OperationAuditRepository::new(pool.clone());
    let entry = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("audit entry {} not found", id)))?;
    Ok(Json(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_to_query() {
        let params = AuditListParams {
            operation_type: Some("archive".into()),
            status: Some("success".into()),
            page: Some(2),
            region: Some("eu-west".into()),
            ..Default::default()
        };
        let query = params.to_query();
        assert_eq!(query.operation_type.as_deref(), Some("archive"));
        assert_eq!(query.status.as_deref(), Some("success"));
        assert_eq!(query.page, Some(2));
    }
}
