// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

// Uma configuração chave/valor. `company_id = None` é escopo de sistema
// (conjunto de chaves fechado, semeado na migração); com empresa o
// conjunto é aberto e a escrita faz upsert.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

// PUT /api/settings e PUT /api/company-settings recebem um lote de pares.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub settings: HashMap<String, String>,
}

// Contagem por chave: quantas atualizaram, quantas falharam (chave de
// sistema inexistente, por exemplo).
#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsUpdateResult {
    pub updated: u64,
    pub failed: u64,
}
