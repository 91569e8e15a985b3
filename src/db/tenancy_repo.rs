// src/db/tenancy_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::tenancy::Company};

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, scope: Option<Uuid>) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE ($1::uuid IS NULL OR id = $1) ORDER BY name ASC",
        )
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE id = $1 AND ($2::uuid IS NULL OR id = $2)",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(executor)
        .await?;
        Ok(company)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        tax_id: Option<&str>,
        address: Option<&str>,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, tax_id, address)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(tax_id)
        .bind(address)
        .fetch_one(executor)
        .await?;
        Ok(company)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scope: Option<Uuid>,
        name: &str,
        tax_id: Option<&str>,
        address: Option<&str>,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET name = $3, tax_id = $4, address = $5, updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR id = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scope)
        .bind(name)
        .bind(tax_id)
        .bind(address)
        .fetch_optional(executor)
        .await?;
        Ok(company)
    }

    // Remoção destrutiva, exclusiva do SuperAdmin. Não verifica
    // dependentes; o banco rejeita se houver referências.
    pub async fn delete<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = sqlx::query_as::<_, Company>(
            "DELETE FROM companies WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(deleted)
    }
}
