use axum::Json;
use axum::extract::{Query, State};
use shopfront_application::{AuditLogFilter, AuditLogService, Pagination};
use shopfront_core::UserId;

use crate::dto::{AuditLogQuery, AuditRecordResponse, PagedResponse};
use crate::error::ApiResult;
use crate::middleware::CurrentSubject;
use crate::state::AppState;

pub async fn list_audit_logs_handler(
    State(state): State<AppState>,
    CurrentSubject(subject): CurrentSubject,
    Query(query): Query<AuditLogQuery>,
) -> ApiResult<Json<PagedResponse<AuditRecordResponse>>> {
    let filter = AuditLogFilter {
        actor_id: query.actor_id.map(UserId::from_uuid),
        resource: query.resource,
        action: query.action,
    };

    let (total, records) = AuditLogService::new(state.audit_store.clone())
        .list(
            &subject,
            filter,
            Pagination::new(query.page, query.page_size),
        )
        .await?;

    Ok(Json(PagedResponse {
        total,
        items: records.into_iter().map(AuditRecordResponse::from).collect(),
    }))
}
