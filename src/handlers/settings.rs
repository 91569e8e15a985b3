// src/handlers/settings.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::{ClientMeta, RequestContext},
        rbac::{ensure, Action, Resource},
    },
    models::{
        audit::AuditAction,
        settings::{Setting, SettingsUpdateResult, UpdateSettingsRequest},
    },
};

// GET /api/settings — escopo de sistema, leitura aberta a autenticados.
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses((status = 200, description = "Configurações de sistema", body = Vec<Setting>)),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    ensure(&ctx, Action::Read, Resource::Setting, None)?;

    let settings = app_state.settings_repo.list(None).await?;
    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings — conjunto de chaves FECHADO: só atualiza chaves que
// existem; as demais contam como falha no resultado.
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Contagem de chaves atualizadas/falhas", body = SettingsUpdateResult),
        (status = 403, description = "Exclusivo do SuperAdmin")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure(&ctx, Action::Update, Resource::Setting, None)?;
    if payload.settings.is_empty() {
        return Err(AppError::EmptySelection);
    }

    let mut updated: u64 = 0;
    let mut failed: u64 = 0;
    for (key, value) in &payload.settings {
        if app_state
            .settings_repo
            .update_system_key(&app_state.db_pool, key, value, ctx.user_id)
            .await?
        {
            updated += 1;
        } else {
            failed += 1;
        }
    }

    // Uma entrada agregada por lote de configurações.
    app_state
        .audit_service
        .record(
            &app_state.db_pool,
            &ctx,
            &meta,
            AuditAction::Update,
            "setting",
            None,
            None,
            Some(json!({
                "scope": "system",
                "keys": payload.settings.keys().collect::<Vec<_>>(),
                "updated": updated,
                "failed": failed,
            })),
        )
        .await?;

    Ok((StatusCode::OK, Json(SettingsUpdateResult { updated, failed })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettingsQuery {
    // Apenas SuperAdmin pode apontar outra empresa.
    pub company_id: Option<Uuid>,
}

// GET /api/company-settings
#[utoipa::path(
    get,
    path = "/api/company-settings",
    tag = "Settings",
    responses((status = 200, description = "Configurações da empresa", body = Vec<Setting>)),
    security(("api_jwt" = []))
)]
pub async fn get_company_settings(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<CompanySettingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let company_id = if ctx.role.is_super_admin() {
        query.company_id.unwrap_or(ctx.company_id)
    } else {
        ctx.company_id
    };
    ensure(&ctx, Action::Read, Resource::Setting, Some(company_id))?;

    let settings = app_state
        .settings_repo
        .list(Some(company_id))
        .await?;
    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/company-settings — conjunto ABERTO, semântica de upsert.
#[utoipa::path(
    put,
    path = "/api/company-settings",
    tag = "Settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Contagem de chaves atualizadas", body = SettingsUpdateResult),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_company_settings(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure(&ctx, Action::Update, Resource::Setting, Some(ctx.company_id))?;
    if payload.settings.is_empty() {
        return Err(AppError::EmptySelection);
    }

    let mut updated: u64 = 0;
    for (key, value) in &payload.settings {
        app_state
            .settings_repo
            .upsert_company_key(&app_state.db_pool, ctx.company_id, key, value, ctx.user_id)
            .await?;
        updated += 1;
    }

    app_state
        .audit_service
        .record(
            &app_state.db_pool,
            &ctx,
            &meta,
            AuditAction::Update,
            "setting",
            None,
            None,
            Some(json!({
                "scope": "company",
                "keys": payload.settings.keys().collect::<Vec<_>>(),
                "updated": updated,
            })),
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(SettingsUpdateResult { updated, failed: 0 }),
    ))
}
