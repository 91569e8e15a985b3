// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    middleware::auth::{ClientMeta, RequestContext},
    models::{
        audit::AuditAction,
        inventory::{Category, Product, Supplier},
    },
    services::audit_service::AuditService,
};

// CRUD do catálogo (produtos, categorias, fornecedores), sempre escopado
// e auditado. O saldo (`stock`) só é tocado na criação: depois disso a
// mudança passa pelo razão ou pelos caminhos administrativos.
#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    audit_service: AuditService,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(
        inventory_repo: InventoryRepository,
        audit_service: AuditService,
        pool: PgPool,
    ) -> Self {
        Self {
            inventory_repo,
            audit_service,
            pool,
        }
    }

    // ---
    // Leituras (sem auditoria: leituras nunca geram linha na trilha)
    // ---

    pub async fn list_products(&self, ctx: &RequestContext) -> Result<Vec<Product>, AppError> {
        self.inventory_repo.list_products(ctx.scope()).await
    }

    pub async fn get_product(&self, ctx: &RequestContext, id: Uuid) -> Result<Product, AppError> {
        self.inventory_repo
            .find_product(&self.pool, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Produto"))
    }

    pub async fn list_categories(&self, ctx: &RequestContext) -> Result<Vec<Category>, AppError> {
        self.inventory_repo.list_categories(ctx.scope()).await
    }

    pub async fn get_category(&self, ctx: &RequestContext, id: Uuid) -> Result<Category, AppError> {
        self.inventory_repo
            .find_category(&self.pool, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Categoria"))
    }

    pub async fn list_suppliers(&self, ctx: &RequestContext) -> Result<Vec<Supplier>, AppError> {
        self.inventory_repo.list_suppliers(ctx.scope()).await
    }

    pub async fn get_supplier(&self, ctx: &RequestContext, id: Uuid) -> Result<Supplier, AppError> {
        self.inventory_repo
            .find_supplier(&self.pool, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Fornecedor"))
    }

    // ---
    // Produtos
    // ---

    #[allow(clippy::too_many_arguments)]
    pub async fn create_product(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        company_id: Uuid,
        category_id: Option<Uuid>,
        supplier_id: Option<Uuid>,
        name: &str,
        sku: &str,
        price: Decimal,
        stock: i32,
        min_stock: i32,
        image_url: Option<&str>,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        let product = self
            .inventory_repo
            .create_product(
                &mut *tx, company_id, category_id, supplier_id, name, sku, price, stock,
                min_stock, image_url,
            )
            .await?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Insert,
                "product",
                Some(product.id),
                None,
                Some(serde_json::to_value(&product).map_err(anyhow::Error::from)?),
            )
            .await?;

        tx.commit().await?;
        Ok(product)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_product(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        id: Uuid,
        category_id: Option<Uuid>,
        supplier_id: Option<Uuid>,
        name: &str,
        sku: &str,
        price: Decimal,
        min_stock: i32,
        image_url: Option<&str>,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        let before = self
            .inventory_repo
            .find_product(&mut *tx, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Produto"))?;

        let updated = self
            .inventory_repo
            .update_product(
                &mut *tx, id, ctx.scope(), category_id, supplier_id, name, sku, price,
                min_stock, image_url,
            )
            .await?
            .ok_or(AppError::NotFound("Produto"))?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Update,
                "product",
                Some(id),
                Some(serde_json::to_value(&before).map_err(anyhow::Error::from)?),
                Some(serde_json::to_value(&updated).map_err(anyhow::Error::from)?),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_product(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = self
            .inventory_repo
            .delete_product(&mut *tx, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Produto"))?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Delete,
                "product",
                Some(id),
                Some(serde_json::to_value(&deleted).map_err(anyhow::Error::from)?),
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ---
    // Categorias
    // ---

    pub async fn create_category(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        company_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        let mut tx = self.pool.begin().await?;

        let category = self
            .inventory_repo
            .create_category(&mut *tx, company_id, name, description)
            .await?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Insert,
                "category",
                Some(category.id),
                None,
                Some(serde_json::to_value(&category).map_err(anyhow::Error::from)?),
            )
            .await?;

        tx.commit().await?;
        Ok(category)
    }

    pub async fn update_category(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        let mut tx = self.pool.begin().await?;

        let before = self
            .inventory_repo
            .find_category(&mut *tx, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Categoria"))?;

        let updated = self
            .inventory_repo
            .update_category(&mut *tx, id, ctx.scope(), name, description)
            .await?
            .ok_or(AppError::NotFound("Categoria"))?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Update,
                "category",
                Some(id),
                Some(serde_json::to_value(&before).map_err(anyhow::Error::from)?),
                Some(serde_json::to_value(&updated).map_err(anyhow::Error::from)?),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_category(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = self
            .inventory_repo
            .delete_category(&mut *tx, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Categoria"))?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Delete,
                "category",
                Some(id),
                Some(serde_json::to_value(&deleted).map_err(anyhow::Error::from)?),
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ---
    // Fornecedores
    // ---

    #[allow(clippy::too_many_arguments)]
    pub async fn create_supplier(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        company_id: Uuid,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Supplier, AppError> {
        let mut tx = self.pool.begin().await?;

        let supplier = self
            .inventory_repo
            .create_supplier(&mut *tx, company_id, name, email, phone, address)
            .await?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Insert,
                "supplier",
                Some(supplier.id),
                None,
                Some(serde_json::to_value(&supplier).map_err(anyhow::Error::from)?),
            )
            .await?;

        tx.commit().await?;
        Ok(supplier)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_supplier(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        id: Uuid,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Supplier, AppError> {
        let mut tx = self.pool.begin().await?;

        let before = self
            .inventory_repo
            .find_supplier(&mut *tx, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Fornecedor"))?;

        let updated = self
            .inventory_repo
            .update_supplier(&mut *tx, id, ctx.scope(), name, email, phone, address)
            .await?
            .ok_or(AppError::NotFound("Fornecedor"))?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Update,
                "supplier",
                Some(id),
                Some(serde_json::to_value(&before).map_err(anyhow::Error::from)?),
                Some(serde_json::to_value(&updated).map_err(anyhow::Error::from)?),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_supplier(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = self
            .inventory_repo
            .delete_supplier(&mut *tx, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Fornecedor"))?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Delete,
                "supplier",
                Some(id),
                Some(serde_json::to_value(&deleted).map_err(anyhow::Error::from)?),
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
