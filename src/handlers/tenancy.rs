// src/handlers/tenancy.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
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
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

pub async fn list_companies(
    State(app_state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let companies = app_state.company_service.list(&ctx).await?;
    Ok((StatusCode::OK, Json(companies)))
}

pub async fn get_company(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.get(&ctx, id).await?;
    Ok((StatusCode::OK, Json(company)))
}

// Criação de empresa é exclusiva do SuperAdmin.
pub async fn create_company(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Json(payload): Json<CompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    ensure(&ctx, Action::Create, Resource::Company, None)?;

    let company = app_state
        .company_service
        .create(
            &ctx,
            &meta,
            &payload.name,
            payload.tax_id.as_deref(),
            payload.address.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn update_company(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    // Para uma empresa, o "dono" é ela própria: Admin só edita a sua.
    ensure(&ctx, Action::Update, Resource::Company, Some(id))?;

    let company = app_state
        .company_service
        .update(
            &ctx,
            &meta,
            id,
            &payload.name,
            payload.tax_id.as_deref(),
            payload.address.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(company)))
}

// Remoção destrutiva, sem verificação de dependentes (SuperAdmin).
pub async fn delete_company(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ensure(&ctx, Action::Delete, Resource::Company, None)?;
    app_state.company_service.delete(&ctx, &meta, id).await?;
    Ok(StatusCode::OK)
}
