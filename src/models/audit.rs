// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Ação registrada na trilha de auditoria. Um registro por mutação
// bem-sucedida; leituras e requisições rejeitadas nunca geram linha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Insert,
    Update,
    Delete,
}

// Linha imutável da trilha. `old_data`/`new_data` são snapshots opacos
// (o documento externo da entidade no momento da mutação) e não são
// revalidados contra o schema atual ao serem lidos.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    #[schema(value_type = Object)]
    pub old_data: Option<serde_json::Value>,
    #[schema(value_type = Object)]
    pub new_data: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Filtro tipado da consulta de auditoria. Vira SQL parametrizado no
// repositório; nenhum valor do usuário é interpolado como texto.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub action: Option<AuditAction>,
    pub entity_type: Option<String>,
}
