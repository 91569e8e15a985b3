// src/services/bulk_service.rs

use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, MovementRepository, SettingsRepository},
    middleware::{
        auth::{ClientMeta, RequestContext},
        rbac::{ensure, Action, Resource},
    },
    models::{
        audit::AuditAction,
        bulk::{BulkAction, BulkOutcome, BulkRequest},
    },
    services::{audit_service::AuditService, image_search::ImageSearch},
};

// Chaves consultadas no Settings Store (empresa primeiro, sistema depois).
const IMAGE_ENDPOINT_KEY: &str = "image_search_endpoint";
const IMAGE_API_KEY: &str = "image_search_api_key";

// O Motor de Mutação em Lote. Cada invocação percorre o mesmo pipeline:
// Autorizar → Validar seleção → Executar → Auditar → Responder.
// O escopo de empresa entra NA MESMA instrução SQL que muta as linhas;
// nunca há "verifica escopado, muta sem escopo".
#[derive(Clone)]
pub struct BulkService {
    inventory_repo: InventoryRepository,
    movement_repo: MovementRepository,
    settings_repo: SettingsRepository,
    audit_service: AuditService,
    image_search: Arc<dyn ImageSearch>,
    pool: PgPool,
}

impl BulkService {
    pub fn new(
        inventory_repo: InventoryRepository,
        movement_repo: MovementRepository,
        settings_repo: SettingsRepository,
        audit_service: AuditService,
        image_search: Arc<dyn ImageSearch>,
        pool: PgPool,
    ) -> Self {
        Self {
            inventory_repo,
            movement_repo,
            settings_repo,
            audit_service,
            image_search,
            pool,
        }
    }

    pub async fn run(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        request: BulkRequest,
    ) -> Result<BulkOutcome, AppError> {
        // 1. Autorizar: Admin/SuperAdmin apenas; empresa alheia só para
        // SuperAdmin. A negação acontece antes de qualquer acesso a dados.
        let requested_company = request.company_id.unwrap_or(ctx.company_id);
        ensure(ctx, Action::Create, Resource::BulkOperation, Some(requested_company))?;

        let company_id = if ctx.role.is_super_admin() {
            requested_company
        } else {
            ctx.company_id
        };

        match request.action {
            BulkAction::ZeroStock => self.zero_stock(ctx, meta, company_id, &request).await,
            BulkAction::ClearMovements => {
                self.clear_movements(ctx, meta, company_id, &request).await
            }
            BulkAction::DeleteProducts => {
                self.delete_products(ctx, meta, company_id, &request).await
            }
            BulkAction::UpdateImages => self.update_images(ctx, meta, company_id, &request).await,
            BulkAction::ChangeCategory => {
                self.change_category(ctx, meta, company_id, &request).await
            }
        }
    }

    fn require_categories(request: &BulkRequest) -> Result<&[Uuid], AppError> {
        if request.category_ids.is_empty() {
            return Err(AppError::EmptySelection);
        }
        Ok(&request.category_ids)
    }

    async fn zero_stock(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        company_id: Uuid,
        request: &BulkRequest,
    ) -> Result<BulkOutcome, AppError> {
        let category_ids = Self::require_categories(request)?;

        let affected = self
            .inventory_repo
            .zero_stock_by_categories(&self.pool, company_id, category_ids)
            .await?;

        // Uma entrada agregada por invocação, não uma por produto.
        self.audit_service
            .record(
                &self.pool,
                ctx,
                meta,
                AuditAction::Update,
                "product",
                None,
                None,
                Some(json!({
                    "bulkAction": "zero-stock",
                    "categoryIds": category_ids,
                    "affected": affected,
                })),
            )
            .await?;

        tracing::info!("Ação em lote zero-stock: {} produto(s) zerados", affected);

        let mut outcome = BulkOutcome::new(BulkAction::ZeroStock);
        outcome.affected = Some(affected);
        Ok(outcome)
    }

    async fn clear_movements(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        company_id: Uuid,
        request: &BulkRequest,
    ) -> Result<BulkOutcome, AppError> {
        let category_ids = Self::require_categories(request)?;

        let deleted = self
            .movement_repo
            .delete_by_categories(&self.pool, company_id, category_ids)
            .await?;

        self.audit_service
            .record(
                &self.pool,
                ctx,
                meta,
                AuditAction::Delete,
                "stock_movement",
                None,
                Some(json!({
                    "bulkAction": "clear-movements",
                    "categoryIds": category_ids,
                    "deleted": deleted,
                })),
                None,
            )
            .await?;

        let mut outcome = BulkOutcome::new(BulkAction::ClearMovements);
        outcome.deleted_movements = Some(deleted);
        Ok(outcome)
    }

    async fn delete_products(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        company_id: Uuid,
        request: &BulkRequest,
    ) -> Result<BulkOutcome, AppError> {
        let category_ids = Self::require_categories(request)?;

        // A ORDEM é estrutural: primeiro as movimentações, depois os
        // produtos. Uma falha no meio pode deixar produtos sem histórico
        // (aceitável), nunca movimentações apontando para produto apagado.
        let deleted_movements = self
            .movement_repo
            .delete_by_categories(&self.pool, company_id, category_ids)
            .await?;

        let deleted_products = self
            .inventory_repo
            .delete_products_by_categories(&self.pool, company_id, category_ids)
            .await?;

        self.audit_service
            .record(
                &self.pool,
                ctx,
                meta,
                AuditAction::Delete,
                "product",
                None,
                Some(json!({
                    "bulkAction": "delete-products",
                    "categoryIds": category_ids,
                    "deletedMovements": deleted_movements,
                    "deletedProducts": deleted_products,
                })),
                None,
            )
            .await?;

        tracing::info!(
            "Ação em lote delete-products: {} movimentações e {} produtos removidos",
            deleted_movements,
            deleted_products
        );

        let mut outcome = BulkOutcome::new(BulkAction::DeleteProducts);
        outcome.deleted_movements = Some(deleted_movements);
        outcome.deleted_products = Some(deleted_products);
        Ok(outcome)
    }

    async fn update_images(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        company_id: Uuid,
        request: &BulkRequest,
    ) -> Result<BulkOutcome, AppError> {
        let category_ids = Self::require_categories(request)?;

        // Credencial da empresa, com fallback para a padrão do sistema.
        let endpoint = self
            .settings_repo
            .get_value(company_id, IMAGE_ENDPOINT_KEY)
            .await?
            .ok_or_else(|| {
                AppError::CollaboratorError("busca de imagens não configurada".to_string())
            })?;
        let api_key = self
            .settings_repo
            .get_value(company_id, IMAGE_API_KEY)
            .await?
            .unwrap_or_default();

        let products = self
            .inventory_repo
            .products_in_categories(&self.pool, company_id, category_ids)
            .await?;

        // Melhor esforço: falha ou ausência de resultado em UM produto
        // vira "skipped" e o lote segue até o fim.
        let mut updated: u64 = 0;
        let mut skipped: u64 = 0;
        for product in &products {
            match self
                .image_search
                .find_image(&endpoint, &api_key, &product.name)
                .await
            {
                Ok(Some(url)) => {
                    let rows = self
                        .inventory_repo
                        .update_product_image(&self.pool, company_id, product.id, &url)
                        .await?;
                    if rows > 0 {
                        updated += 1;
                    } else {
                        skipped += 1;
                    }
                }
                Ok(None) => skipped += 1,
                Err(e) => {
                    tracing::warn!(
                        "Busca de imagem falhou para o produto {}: {}",
                        product.id,
                        e
                    );
                    skipped += 1;
                }
            }
        }

        self.audit_service
            .record(
                &self.pool,
                ctx,
                meta,
                AuditAction::Update,
                "product",
                None,
                None,
                Some(json!({
                    "bulkAction": "update-images",
                    "categoryIds": category_ids,
                    "updated": updated,
                    "skipped": skipped,
                })),
            )
            .await?;

        let mut outcome = BulkOutcome::new(BulkAction::UpdateImages);
        outcome.updated = Some(updated);
        outcome.skipped = Some(skipped);
        Ok(outcome)
    }

    async fn change_category(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        company_id: Uuid,
        request: &BulkRequest,
    ) -> Result<BulkOutcome, AppError> {
        if request.product_ids.is_empty() {
            return Err(AppError::EmptySelection);
        }
        let target_category_id = request
            .target_category_id
            .ok_or(AppError::InvalidTarget("Categoria"))?;

        // A categoria de destino precisa existir NA empresa do chamador.
        self.inventory_repo
            .find_category(&self.pool, target_category_id, Some(company_id))
            .await?
            .ok_or(AppError::InvalidTarget("Categoria"))?;

        // Ids de outra empresa (ou inexistentes) ficam de fora da contagem
        // sem erro individual: o UPDATE é escopado na própria instrução.
        let affected = self
            .inventory_repo
            .change_category(&self.pool, company_id, &request.product_ids, target_category_id)
            .await?;

        self.audit_service
            .record(
                &self.pool,
                ctx,
                meta,
                AuditAction::Update,
                "product",
                None,
                None,
                Some(json!({
                    "bulkAction": "change-category",
                    "productIds": request.product_ids,
                    "targetCategoryId": target_category_id,
                    "affected": affected,
                })),
            )
            .await?;

        let mut outcome = BulkOutcome::new(BulkAction::ChangeCategory);
        outcome.affected = Some(affected);
        Ok(outcome)
    }
}
