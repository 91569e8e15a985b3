// src/handlers/users.rs

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
    models::auth::Role,
};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    pub role: Role,
    pub avatar: Option<String>,

    // Honrado apenas para SuperAdmin.
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    pub role: Role,
    pub avatar: Option<String>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub current_password: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub new_password: String,
}

// Ninguém concede papel acima do próprio.
fn ensure_role_not_above(ctx: &RequestContext, requested: Role) -> Result<(), AppError> {
    if requested > ctx.role {
        return Err(AppError::AccessDenied);
    }
    Ok(())
}

// ---
// Handlers
// ---

pub async fn list_users(
    State(app_state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    ensure(&ctx, Action::Read, Resource::User, Some(ctx.company_id))?;
    let users = app_state.user_repo.list(&app_state.db_pool, ctx.scope()).await?;
    Ok((StatusCode::OK, Json(users)))
}

pub async fn get_user(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ensure(&ctx, Action::Read, Resource::User, Some(ctx.company_id))?;
    let user = app_state
        .user_repo
        .find_scoped(&app_state.db_pool, id, ctx.scope())
        .await?
        .ok_or(AppError::NotFound("Usuário"))?;
    Ok((StatusCode::OK, Json(user)))
}

pub async fn create_user(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let target_company = payload.company_id.unwrap_or(ctx.company_id);
    ensure(&ctx, Action::Create, Resource::User, Some(target_company))?;
    ensure_role_not_above(&ctx, payload.role)?;

    let user = app_state
        .auth_service
        .create_user(
            &ctx,
            &meta,
            target_company,
            &payload.name,
            &payload.email,
            &payload.password,
            payload.role,
            payload.avatar.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    ensure(&ctx, Action::Update, Resource::User, Some(ctx.company_id))?;
    ensure_role_not_above(&ctx, payload.role)?;

    let user = app_state
        .auth_service
        .update_user(
            &ctx,
            &meta,
            id,
            &payload.name,
            &payload.email,
            payload.role,
            payload.avatar.as_deref(),
            payload.company_id,
        )
        .await?;

    Ok((StatusCode::OK, Json(user)))
}

pub async fn delete_user(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ensure(&ctx, Action::Delete, Resource::User, Some(ctx.company_id))?;
    app_state.auth_service.delete_user(&ctx, &meta, id).await?;
    Ok(StatusCode::OK)
}

// PUT /api/users/me/password — self-service, qualquer papel.
pub async fn change_my_password(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .auth_service
        .change_password(&ctx, &meta, &payload.current_password, &payload.new_password)
        .await?;

    Ok(StatusCode::OK)
}
