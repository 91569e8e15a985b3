// src/db/movement_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{MovementType, Product, StockMovement},
};

// Repositório do livro-razão. Linhas de movimentação nunca recebem
// UPDATE; a única remoção permitida são as ações em lote.
#[derive(Clone)]
pub struct MovementRepository {
    pool: PgPool,
}

impl MovementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope: Option<Uuid>,
        product_id: Option<Uuid>,
    ) -> Result<Vec<StockMovement>, AppError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE ($1::uuid IS NULL OR company_id = $1)
              AND ($2::uuid IS NULL OR product_id = $2)
            ORDER BY moved_at DESC
            "#,
        )
        .bind(scope)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    /// Registra uma movimentação no livro-razão.
    pub async fn record<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
        user_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
        reason: Option<&str>,
        moved_at: Option<DateTime<Utc>>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements
                (company_id, product_id, user_id, movement_type, quantity, reason, moved_at)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(product_id)
        .bind(user_id)
        .bind(movement_type)
        .bind(quantity)
        .bind(reason)
        .bind(moved_at)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }

    /// Incremento/decremento atômico do saldo materializado. O
    /// read-modify-write acontece em UMA instrução (`stock = stock + $3`),
    /// então movimentações concorrentes no mesmo produto não se perdem.
    pub async fn apply_stock_delta<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
        delta: i32,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET stock = stock + $3, updated_at = NOW()
            WHERE id = $2 AND company_id = $1
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(product_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// SET absoluto do saldo (Ajuste e correção da reconciliação).
    pub async fn set_stock_absolute<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
        stock: i32,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET stock = $3, updated_at = NOW()
            WHERE id = $2 AND company_id = $1
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(product_id)
        .bind(stock)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// Histórico completo de um produto, ordenado para o replay da
    /// reconciliação (data ascendente).
    pub async fn history_for_product<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE company_id = $1 AND product_id = $2
            ORDER BY moved_at ASC, created_at ASC
            "#,
        )
        .bind(company_id)
        .bind(product_id)
        .fetch_all(executor)
        .await?;
        Ok(movements)
    }

    /// Produtos elegíveis à reconciliação: pelo menos UMA movimentação.
    /// Produtos sem histórico nunca são apontados como divergentes (o
    /// saldo pode ter sido definido por caminhos fora do razão).
    pub async fn products_with_history<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products p
            WHERE p.company_id = $1
              AND EXISTS (SELECT 1 FROM stock_movements m WHERE m.product_id = p.id)
            ORDER BY p.name ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    /// Remove as movimentações dos produtos das categorias dadas.
    /// Usada por clear-movements e como PRIMEIRO passo de delete-products
    /// (a ordem garante que nenhuma movimentação órfã sobreviva).
    pub async fn delete_by_categories<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM stock_movements
            WHERE company_id = $1
              AND product_id IN (
                  SELECT id FROM products
                  WHERE company_id = $1 AND category_id = ANY($2)
              )
            "#,
        )
        .bind(company_id)
        .bind(category_ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
