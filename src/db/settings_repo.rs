// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::settings::Setting};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Configurações de um escopo: `None` = sistema, `Some` = empresa.
    pub async fn list(&self, company_id: Option<Uuid>) -> Result<Vec<Setting>, AppError> {
        let settings = sqlx::query_as::<_, Setting>(
            r#"
            SELECT * FROM settings
            WHERE ($1::uuid IS NULL AND company_id IS NULL) OR company_id = $1
            ORDER BY key ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(settings)
    }

    /// Busca um valor com fallback explícito: primeiro a chave da empresa,
    /// depois a de sistema. O ORDER BY torna o "primeira linha vence"
    /// determinístico em vez de implícito.
    pub async fn get_value(
        &self,
        company_id: Uuid,
        key: &str,
    ) -> Result<Option<String>, AppError> {
        let value: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT value FROM settings
            WHERE key = $2 AND (company_id = $1 OR company_id IS NULL)
            ORDER BY company_id NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value.map(|(v,)| v))
    }

    /// Escopo de sistema: o conjunto de chaves é FECHADO. Só UPDATE;
    /// uma chave inexistente resulta em 0 linhas e conta como falha.
    pub async fn update_system_key<'e, E>(
        &self,
        executor: E,
        key: &str,
        value: &str,
        updated_by: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE settings
            SET value = $2, updated_by = $3, updated_at = NOW()
            WHERE company_id IS NULL AND key = $1
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(updated_by)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Escopo de empresa: conjunto aberto, semântica de UPSERT explícita
    /// (nada de "verifica e depois insere" em duas instruções).
    pub async fn upsert_company_key<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        key: &str,
        value: &str,
        updated_by: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO settings (company_id, key, value, updated_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (company_id, key) WHERE company_id IS NOT NULL
            DO UPDATE SET value = EXCLUDED.value,
                          updated_by = EXCLUDED.updated_by,
                          updated_at = NOW()
            "#,
        )
        .bind(company_id)
        .bind(key)
        .bind(value)
        .bind(updated_by)
        .execute(executor)
        .await?;
        Ok(())
    }
}
