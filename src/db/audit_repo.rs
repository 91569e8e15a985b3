// src/db/audit_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::audit::{ActivityLog, AuditAction, AuditFilter},
};

// Teto de linhas por consulta, para limitar o tamanho da resposta.
const QUERY_LIMIT: i64 = 1000;

// Repositório da trilha de auditoria. Só INSERT e SELECT: a aplicação
// jamais atualiza ou remove linhas desta tabela.
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        company_id: Uuid,
        action: AuditAction,
        entity_type: &str,
        entity_id: Option<Uuid>,
        old_data: Option<serde_json::Value>,
        new_data: Option<serde_json::Value>,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO activity_log
                (user_id, company_id, action, entity_type, entity_id,
                 old_data, new_data, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(old_data)
        .bind(new_data)
        .bind(ip_address)
        .bind(user_agent)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn query(&self, filter: &AuditFilter) -> Result<Vec<ActivityLog>, AppError> {
        let mut builder = build_filter_query(filter);
        let rows = builder
            .build_query_as::<ActivityLog>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

// Monta a consulta a partir do filtro TIPADO. Cada valor entra como
// parâmetro (`push_bind`); nada do usuário é concatenado como texto.
fn build_filter_query(filter: &AuditFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<'static, Postgres> =
        QueryBuilder::new("SELECT * FROM activity_log WHERE 1 = 1");

    if let Some(company_id) = filter.company_id {
        builder.push(" AND company_id = ").push_bind(company_id);
    }
    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(action) = filter.action {
        builder.push(" AND action = ").push_bind(action);
    }
    if let Some(entity_type) = &filter.entity_type {
        builder.push(" AND entity_type = ").push_bind(entity_type.clone());
    }
    if let Some(from) = filter.from {
        builder.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND created_at <= ").push_bind(to);
    }

    builder.push(" ORDER BY created_at DESC LIMIT ");
    builder.push_bind(QUERY_LIMIT);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn filtro_vazio_so_ordena_e_limita() {
        let builder = build_filter_query(&AuditFilter::default());
        let sql = builder.sql();
        assert!(sql.starts_with("SELECT * FROM activity_log WHERE 1 = 1"));
        assert!(sql.contains("ORDER BY created_at DESC LIMIT $1"));
        assert!(!sql.contains("company_id"));
    }

    #[test]
    fn cada_campo_vira_parametro_posicional() {
        let filter = AuditFilter {
            from: Some(Utc::now()),
            to: Some(Utc::now()),
            user_id: Some(Uuid::new_v4()),
            company_id: Some(Uuid::new_v4()),
            action: Some(AuditAction::Update),
            entity_type: Some("product".to_string()),
        };
        let builder = build_filter_query(&filter);
        let sql = builder.sql();

        assert!(sql.contains("company_id = $1"));
        assert!(sql.contains("user_id = $2"));
        assert!(sql.contains("action = $3"));
        assert!(sql.contains("entity_type = $4"));
        assert!(sql.contains("created_at >= $5"));
        assert!(sql.contains("created_at <= $6"));
        assert!(sql.contains("LIMIT $7"));
        // Nenhum valor interpolado como texto.
        assert!(!sql.contains('\''));
    }
}
