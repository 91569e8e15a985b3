// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::{ClientMeta, RequestContext},
        rbac::{ensure, Action, Resource},
    },
    models::inventory::Product,
};

// ---
// Validação customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateProduct
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    pub sku: String,

    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,

    #[validate(custom(function = validate_not_negative))]
    #[serde(default)] // Se o JSON não tiver esse campo, assume 0
    pub price: Decimal,

    // O saldo inicial NÃO passa pelo razão: é a baseline do produto.
    #[serde(default)]
    pub stock: i32,

    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    #[serde(default)]
    pub min_stock: i32,

    pub image_url: Option<String>,

    // Honrado apenas para SuperAdmin; os demais criam na própria empresa.
    pub company_id: Option<Uuid>,
}

// ---
// Handler: create_product
// ---
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Inventory",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 403, description = "Sem permissão"),
        (status = 409, description = "SKU já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // A empresa é forçada para a do chamador; apontar outra empresa no
    // payload é negado antes de tocar em dados (exceto SuperAdmin).
    let target_company = payload.company_id.unwrap_or(ctx.company_id);
    ensure(&ctx, Action::Create, Resource::Product, Some(target_company))?;

    let product = app_state
        .inventory_service
        .create_product(
            &ctx,
            &meta,
            target_company,
            payload.category_id,
            payload.supplier_id,
            &payload.name,
            &payload.sku,
            payload.price,
            payload.stock,
            payload.min_stock,
            payload.image_url.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// ---
// Handler: list_products
// ---
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Inventory",
    responses(
        (status = 200, description = "Produtos da empresa do chamador", body = Vec<Product>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.inventory_service.list_products(&ctx).await?;
    Ok((StatusCode::OK, Json(products)))
}

pub async fn get_product(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.inventory_service.get_product(&ctx, id).await?;
    Ok((StatusCode::OK, Json(product)))
}

// ---
// Payload: UpdateProduct (companyId é imutável; stock só muda pelo razão)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    pub sku: String,

    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,

    #[validate(custom(function = validate_not_negative))]
    #[serde(default)]
    pub price: Decimal,

    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    #[serde(default)]
    pub min_stock: i32,

    pub image_url: Option<String>,
}

pub async fn update_product(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    ensure(&ctx, Action::Update, Resource::Product, Some(ctx.company_id))?;

    let product = app_state
        .inventory_service
        .update_product(
            &ctx,
            &meta,
            id,
            payload.category_id,
            payload.supplier_id,
            &payload.name,
            &payload.sku,
            payload.price,
            payload.min_stock,
            payload.image_url.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

pub async fn delete_product(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ensure(&ctx, Action::Delete, Resource::Product, Some(ctx.company_id))?;
    app_state.inventory_service.delete_product(&ctx, &meta, id).await?;
    Ok(StatusCode::OK)
}

// ---
// Payload: Categoria
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    pub company_id: Option<Uuid>,
}

pub async fn create_category(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let target_company = payload.company_id.unwrap_or(ctx.company_id);
    ensure(&ctx, Action::Create, Resource::Category, Some(target_company))?;

    let category = app_state
        .inventory_service
        .create_category(&ctx, &meta, target_company, &payload.name, payload.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(app_state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.inventory_service.list_categories(&ctx).await?;
    Ok((StatusCode::OK, Json(categories)))
}

pub async fn get_category(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state.inventory_service.get_category(&ctx, id).await?;
    Ok((StatusCode::OK, Json(category)))
}

pub async fn update_category(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    ensure(&ctx, Action::Update, Resource::Category, Some(ctx.company_id))?;

    let category = app_state
        .inventory_service
        .update_category(&ctx, &meta, id, &payload.name, payload.description.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(category)))
}

pub async fn delete_category(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ensure(&ctx, Action::Delete, Resource::Category, Some(ctx.company_id))?;
    app_state.inventory_service.delete_category(&ctx, &meta, id).await?;
    Ok(StatusCode::OK)
}

// ---
// Payload: Fornecedor
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_id: Option<Uuid>,
}

pub async fn create_supplier(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let target_company = payload.company_id.unwrap_or(ctx.company_id);
    ensure(&ctx, Action::Create, Resource::Supplier, Some(target_company))?;

    let supplier = app_state
        .inventory_service
        .create_supplier(
            &ctx,
            &meta,
            target_company,
            &payload.name,
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.address.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn list_suppliers(
    State(app_state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.inventory_service.list_suppliers(&ctx).await?;
    Ok((StatusCode::OK, Json(suppliers)))
}

pub async fn get_supplier(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = app_state.inventory_service.get_supplier(&ctx, id).await?;
    Ok((StatusCode::OK, Json(supplier)))
}

pub async fn update_supplier(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Path(id): Path<Uuid>,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    ensure(&ctx, Action::Update, Resource::Supplier, Some(ctx.company_id))?;

    let supplier = app_state
        .inventory_service
        .update_supplier(
            &ctx,
            &meta,
            id,
            &payload.name,
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.address.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(supplier)))
}

pub async fn delete_supplier(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    meta: ClientMeta,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ensure(&ctx, Action::Delete, Resource::Supplier, Some(ctx.company_id))?;
    app_state.inventory_service.delete_supplier(&ctx, &meta, id).await?;
    Ok(StatusCode::OK)
}
