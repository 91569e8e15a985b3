// src/handlers/activity_log.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::RequestContext,
        rbac::{ensure, Action, Resource},
    },
    models::audit::{ActivityLog, AuditAction, AuditFilter},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub action: Option<AuditAction>,
    pub entity_type: Option<String>,
}

// GET /api/activity-log
// Quem não é SuperAdmin recebe apenas a própria empresa; os filtros
// extras são ignorados para esses papéis (forçado no serviço).
#[utoipa::path(
    get,
    path = "/api/activity-log",
    tag = "Audit",
    responses(
        (status = 200, description = "Trilha de auditoria, mais recente primeiro (máx. 1000 linhas)", body = Vec<ActivityLog>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn query_activity_log(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ActivityLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    ensure(&ctx, Action::Read, Resource::ActivityLog, Some(ctx.company_id))?;

    let filter = AuditFilter {
        from: query.from,
        to: query.to,
        user_id: query.user_id,
        company_id: query.company_id,
        action: query.action,
        entity_type: query.entity_type,
    };

    let rows = app_state.audit_service.query(&ctx, filter).await?;
    Ok((StatusCode::OK, Json(rows)))
}
