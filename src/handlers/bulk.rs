// src/handlers/bulk.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{ClientMeta, RequestContext},
    models::bulk::{BulkOutcome, BulkRequest},
};

// POST /api/bulk-operations
// A autorização (Admin/SuperAdmin) e a validação da seleção acontecem
// dentro do motor, antes de qualquer mutação.
#[utoipa::path(
    post,
    path = "/api/bulk-operations",
    tag = "Bulk",
    request_body = BulkRequest,
    responses(
        (status = 200, description = "Contagens da ação executada", body = BulkOutcome),
        (status = 400, description = "Seleção vazia ou alvo inválido"),
        (status = 403, description = "Papel sem acesso a ações em lote")
    ),
    security(("api_jwt" = []))
)]
pub async fn run_bulk_operation(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Json(payload): Json<BulkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.bulk_service.run(&ctx, &meta, payload).await?;
    Ok((StatusCode::OK, Json(outcome)))
}
