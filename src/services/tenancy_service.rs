// src/services/tenancy_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CompanyRepository,
    middleware::auth::{ClientMeta, RequestContext},
    models::{audit::AuditAction, tenancy::Company},
    services::audit_service::AuditService,
};

#[derive(Clone)]
pub struct CompanyService {
    company_repo: CompanyRepository,
    audit_service: AuditService,
    pool: PgPool,
}

impl CompanyService {
    pub fn new(company_repo: CompanyRepository, audit_service: AuditService, pool: PgPool) -> Self {
        Self {
            company_repo,
            audit_service,
            pool,
        }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<Company>, AppError> {
        self.company_repo.list(ctx.scope()).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Company, AppError> {
        self.company_repo
            .find(&self.pool, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Empresa"))
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        name: &str,
        tax_id: Option<&str>,
        address: Option<&str>,
    ) -> Result<Company, AppError> {
        let mut tx = self.pool.begin().await?;

        let company = self.company_repo.create(&mut *tx, name, tax_id, address).await?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Insert,
                "company",
                Some(company.id),
                None,
                Some(serde_json::to_value(&company).map_err(anyhow::Error::from)?),
            )
            .await?;

        tx.commit().await?;
        Ok(company)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        id: Uuid,
        name: &str,
        tax_id: Option<&str>,
        address: Option<&str>,
    ) -> Result<Company, AppError> {
        let mut tx = self.pool.begin().await?;

        let before = self
            .company_repo
            .find(&mut *tx, id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;

        let updated = self
            .company_repo
            .update(&mut *tx, id, ctx.scope(), name, tax_id, address)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Update,
                "company",
                Some(id),
                Some(serde_json::to_value(&before).map_err(anyhow::Error::from)?),
                Some(serde_json::to_value(&updated).map_err(anyhow::Error::from)?),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // Remoção destrutiva e sem verificação de dependentes (SuperAdmin).
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = self
            .company_repo
            .delete(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Delete,
                "company",
                Some(id),
                Some(serde_json::to_value(&deleted).map_err(anyhow::Error::from)?),
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
