// src/handlers/movements.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::{ClientMeta, RequestContext},
        rbac::{ensure, Action, Resource},
    },
    models::inventory::{MovementType, ReconciliationReport, StockMovement},
};

// --- DTO: Movimentação ---
// O campo externo chama-se "type" e aceita as formas bilíngues
// ("Entrada"/"in", ...); a normalização vive no Deserialize do enum.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementPayload {
    pub product_id: Uuid,

    #[serde(rename = "type")]
    pub movement_type: MovementType,

    pub quantity: i32,

    pub reason: Option<String>,

    // Opcional: data do fato gerador; ausente usa o agora.
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementListQuery {
    pub product_id: Option<Uuid>,
}

// GET /api/stock-movements
#[utoipa::path(
    get,
    path = "/api/stock-movements",
    tag = "Stock Ledger",
    params(("productId" = Option<Uuid>, Query, description = "Filtra por produto")),
    responses(
        (status = 200, description = "Movimentações da empresa do chamador", body = Vec<StockMovement>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<MovementListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state
        .ledger_service
        .list_movements(&ctx, query.product_id)
        .await?;
    Ok((StatusCode::OK, Json(movements)))
}

// POST /api/stock-movements
#[utoipa::path(
    post,
    path = "/api/stock-movements",
    tag = "Stock Ledger",
    request_body = CreateMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada e saldo atualizado", body = StockMovement),
        (status = 404, description = "Produto fora do escopo visível")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_movement(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Json(payload): Json<CreateMovementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    ensure(&ctx, Action::Create, Resource::StockMovement, Some(ctx.company_id))?;

    let movement = app_state
        .ledger_service
        .apply_movement(
            &ctx,
            &meta,
            payload.product_id,
            payload.movement_type,
            payload.quantity,
            payload.reason.as_deref(),
            payload.date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// ---
// Reconciliação (operação administrativa, fora do caminho quente)
// ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationQuery {
    // Apenas SuperAdmin pode apontar outra empresa.
    pub company_id: Option<Uuid>,
}

// GET /api/stock/reconciliation — diagnóstico, nunca altera dados.
#[utoipa::path(
    get,
    path = "/api/stock/reconciliation",
    tag = "Stock Ledger",
    responses(
        (status = 200, description = "Produtos cujo saldo diverge do replay do histórico", body = Vec<ReconciliationReport>),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn reconcile_report(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ReconciliationQuery>,
) -> Result<impl IntoResponse, AppError> {
    let target = query.company_id.unwrap_or(ctx.company_id);
    ensure(&ctx, Action::Create, Resource::BulkOperation, Some(target))?;

    let reports = app_state.ledger_service.reconcile(&ctx, query.company_id).await?;
    Ok((StatusCode::OK, Json(reports)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationConfirmPayload {
    pub product_ids: Vec<Uuid>,
    pub company_id: Option<Uuid>,
}

// POST /api/stock/reconciliation — a confirmação EXPLÍCITA que grava os
// saldos corrigidos.
#[utoipa::path(
    post,
    path = "/api/stock/reconciliation",
    tag = "Stock Ledger",
    request_body = ReconciliationConfirmPayload,
    responses(
        (status = 200, description = "Produtos corrigidos", body = Vec<ReconciliationReport>),
        (status = 400, description = "Seleção vazia"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn reconcile_confirm(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Json(payload): Json<ReconciliationConfirmPayload>,
) -> Result<impl IntoResponse, AppError> {
    let target = payload.company_id.unwrap_or(ctx.company_id);
    ensure(&ctx, Action::Create, Resource::BulkOperation, Some(target))?;

    let corrected = app_state
        .ledger_service
        .reconcile_apply(&ctx, &meta, &payload.product_ids, payload.company_id)
        .await?;
    Ok((StatusCode::OK, Json(corrected)))
}
