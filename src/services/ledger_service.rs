// src/services/ledger_service.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, MovementRepository},
    middleware::auth::{ClientMeta, RequestContext},
    models::{
        audit::AuditAction,
        inventory::{MovementType, ReconciliationReport, StockMovement},
    },
    services::audit_service::AuditService,
};

/// Replay do histórico: fold da esquerda partindo de 0, com a MESMA
/// semântica de tipos do caminho quente (Ajuste zera o acumulado e
/// define o valor; Entrada/Saída aplicam deltas).
pub fn replay<I>(history: I) -> i32
where
    I: IntoIterator<Item = (MovementType, i32)>,
{
    history
        .into_iter()
        .fold(0, |running, (movement_type, quantity)| {
            movement_type.apply(running, quantity)
        })
}

// O Livro-Razão: mantém `Product.stock` consistente com o histórico
// append-only e fornece a reconciliação para detectar/corrigir deriva.
#[derive(Clone)]
pub struct LedgerService {
    movement_repo: MovementRepository,
    inventory_repo: InventoryRepository,
    audit_service: AuditService,
    pool: PgPool,
}

impl LedgerService {
    pub fn new(
        movement_repo: MovementRepository,
        inventory_repo: InventoryRepository,
        audit_service: AuditService,
        pool: PgPool,
    ) -> Self {
        Self {
            movement_repo,
            inventory_repo,
            audit_service,
            pool,
        }
    }

    pub async fn list_movements(
        &self,
        ctx: &RequestContext,
        product_id: Option<Uuid>,
    ) -> Result<Vec<StockMovement>, AppError> {
        self.movement_repo.list(ctx.scope(), product_id).await
    }

    /// Aplica uma movimentação: valida que o produto pertence à empresa
    /// atuante e, na mesma transação, (a) insere a linha do razão e
    /// (b) atualiza o saldo com UMA instrução derivada do tipo.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_movement(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        product_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
        reason: Option<&str>,
        moved_at: Option<DateTime<Utc>>,
    ) -> Result<StockMovement, AppError> {
        let mut tx = self.pool.begin().await?;

        let product = self
            .inventory_repo
            .find_product(&mut *tx, product_id, ctx.scope())
            .await?
            .ok_or(AppError::NotFound("Produto"))?;

        let movement = self
            .movement_repo
            .record(
                &mut *tx,
                product.company_id,
                product_id,
                ctx.user_id,
                movement_type,
                quantity,
                reason,
                moved_at,
            )
            .await?;

        // O sinal da quantidade não é validado: um Ajuste negativo define
        // o saldo como o próprio valor negativo.
        match movement_type {
            MovementType::In => {
                self.movement_repo
                    .apply_stock_delta(&mut *tx, product.company_id, product_id, quantity)
                    .await?
            }
            MovementType::Out => {
                self.movement_repo
                    .apply_stock_delta(&mut *tx, product.company_id, product_id, -quantity)
                    .await?
            }
            MovementType::Adjustment => {
                self.movement_repo
                    .set_stock_absolute(&mut *tx, product.company_id, product_id, quantity)
                    .await?
            }
        }
        .ok_or(AppError::NotFound("Produto"))?;

        self.audit_service
            .record(
                &mut *tx,
                ctx,
                meta,
                AuditAction::Insert,
                "stock_movement",
                Some(movement.id),
                None,
                Some(serde_json::to_value(&movement).map_err(anyhow::Error::from)?),
            )
            .await?;

        tx.commit().await?;
        Ok(movement)
    }

    /// Reconciliação (diagnóstico): recalcula o saldo de cada produto COM
    /// histórico e devolve só os divergentes. Operação administrativa,
    /// fora do caminho quente; assume ausência de escritores concorrentes
    /// nos produtos visitados. Nunca altera dados.
    pub async fn reconcile(
        &self,
        ctx: &RequestContext,
        company_override: Option<Uuid>,
    ) -> Result<Vec<ReconciliationReport>, AppError> {
        let company_id = self.resolve_company(ctx, company_override);

        let products = self
            .movement_repo
            .products_with_history(&self.pool, company_id)
            .await?;

        let mut reports = Vec::new();
        for product in products {
            let history = self
                .movement_repo
                .history_for_product(&self.pool, company_id, product.id)
                .await?;
            let movement_count = history.len() as i64;
            let computed =
                replay(history.iter().map(|m| (m.movement_type, m.quantity)));

            if computed != product.stock {
                reports.push(ReconciliationReport {
                    product_id: product.id,
                    name: product.name,
                    stored_stock: product.stock,
                    computed_stock: computed,
                    diff: computed - product.stock,
                    movement_count,
                });
            }
        }
        Ok(reports)
    }

    /// Correção CONFIRMADA: grava `stock := computado` nos produtos
    /// indicados, um registro de auditoria por produto corrigido.
    pub async fn reconcile_apply(
        &self,
        ctx: &RequestContext,
        meta: &ClientMeta,
        product_ids: &[Uuid],
        company_override: Option<Uuid>,
    ) -> Result<Vec<ReconciliationReport>, AppError> {
        if product_ids.is_empty() {
            return Err(AppError::EmptySelection);
        }
        let company_id = self.resolve_company(ctx, company_override);

        let mut tx = self.pool.begin().await?;
        let mut corrected = Vec::new();

        for &product_id in product_ids {
            let Some(product) = self
                .inventory_repo
                .find_product(&mut *tx, product_id, Some(company_id))
                .await?
            else {
                // Id de fora da empresa (ou inexistente): silenciosamente
                // fora da contagem, como nas ações em lote.
                continue;
            };

            let history = self
                .movement_repo
                .history_for_product(&mut *tx, company_id, product_id)
                .await?;
            if history.is_empty() {
                // Sem histórico não há deriva a corrigir.
                continue;
            }
            let computed =
                replay(history.iter().map(|m| (m.movement_type, m.quantity)));
            if computed == product.stock {
                continue;
            }

            let updated = self
                .movement_repo
                .set_stock_absolute(&mut *tx, company_id, product_id, computed)
                .await?
                .ok_or(AppError::NotFound("Produto"))?;

            self.audit_service
                .record(
                    &mut *tx,
                    ctx,
                    meta,
                    AuditAction::Update,
                    "product",
                    Some(product_id),
                    Some(serde_json::to_value(&product).map_err(anyhow::Error::from)?),
                    Some(serde_json::to_value(&updated).map_err(anyhow::Error::from)?),
                )
                .await?;

            corrected.push(ReconciliationReport {
                product_id,
                name: updated.name,
                stored_stock: product.stock,
                computed_stock: computed,
                diff: computed - product.stock,
                movement_count: history.len() as i64,
            });
        }

        tx.commit().await?;
        Ok(corrected)
    }

    fn resolve_company(&self, ctx: &RequestContext, company_override: Option<Uuid>) -> Uuid {
        if ctx.role.is_super_admin() {
            company_override.unwrap_or(ctx.company_id)
        } else {
            ctx.company_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::MovementType::{Adjustment, In, Out};

    #[test]
    fn replay_soma_entradas_e_subtrai_saidas() {
        let computed = replay([(In, 100), (In, 50), (Out, 30)]);
        assert_eq!(computed, 120);
    }

    #[test]
    fn ajuste_zera_o_acumulado_e_define_o_valor() {
        // Entrada 100 + Entrada 50 = 150; Ajuste 80 NÃO soma (seria 230).
        let computed = replay([(In, 100), (In, 50), (Adjustment, 80)]);
        assert_eq!(computed, 80);

        // Movimentações depois do ajuste voltam a aplicar deltas.
        let computed = replay([(In, 100), (Adjustment, 80), (Out, 10)]);
        assert_eq!(computed, 70);
    }

    #[test]
    fn ajuste_negativo_define_saldo_negativo() {
        let computed = replay([(In, 5), (Adjustment, -3)]);
        assert_eq!(computed, -3);
    }

    #[test]
    fn replay_de_historico_vazio_e_zero() {
        let vazio: Vec<(MovementType, i32)> = Vec::new();
        assert_eq!(replay(vazio), 0);
    }

    #[test]
    fn replay_e_deterministico() {
        // Diagnóstico idempotente: duas passadas sobre o mesmo histórico
        // produzem o mesmo saldo.
        let history = [(In, 10), (Out, 4), (Adjustment, 7), (In, 1)];
        assert_eq!(replay(history), replay(history));
        assert_eq!(replay(history), 8);
    }
}
