// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 2. Fornecedores ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 3. Produtos ---
// O campo `stock` é o saldo materializado; a verdade histórica vive no
// livro-razão (stock_movements) e a reconciliação compara os dois.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub company_id: Uuid,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub stock: i32,
    pub min_stock: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 4. Tipo de Movimentação ---
// A superfície de entrada é bilíngue ("Entrada"/"in", "Saída"/"out",
// "Ajuste"/"adjustment"), sem distinção de maiúsculas. A normalização
// acontece AQUI, na borda de desserialização; o resto do código só
// enxerga a variante fechada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
}

impl MovementType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "in" | "entrada" => Some(MovementType::In),
            "out" | "saída" | "saida" => Some(MovementType::Out),
            "adjustment" | "ajuste" => Some(MovementType::Adjustment),
            _ => None,
        }
    }

    /// Aplica a semântica do tipo sobre um saldo corrente.
    /// Ajuste é um SET absoluto, não um delta.
    pub fn apply(&self, running: i32, quantity: i32) -> i32 {
        match self {
            MovementType::In => running + quantity,
            MovementType::Out => running - quantity,
            MovementType::Adjustment => quantity,
        }
    }
}

impl<'de> Deserialize<'de> for MovementType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        MovementType::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("tipo de movimentação desconhecido: '{}'", raw))
        })
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
        };
        f.write_str(s)
    }
}

// --- 5. Movimentações de Estoque (Histórico) ---
// Linhas append-only: nunca atualizadas, removidas apenas pelas ações
// em lote (clear-movements / delete-products).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub company_id: Uuid,
    pub product_id: Uuid,
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: Option<String>,
    pub moved_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// --- 6. Relatório de Reconciliação ---
// Saída do replay offline: um item por produto com divergência.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub product_id: Uuid,
    pub name: String,
    pub stored_stock: i32,
    pub computed_stock: i32,
    pub diff: i32,
    pub movement_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aceita_formas_bilingues_sem_distincao_de_caixa() {
        assert_eq!(MovementType::parse("Entrada"), Some(MovementType::In));
        assert_eq!(MovementType::parse("entrada"), Some(MovementType::In));
        assert_eq!(MovementType::parse("IN"), Some(MovementType::In));
        assert_eq!(MovementType::parse("Saída"), Some(MovementType::Out));
        assert_eq!(MovementType::parse("saida"), Some(MovementType::Out));
        assert_eq!(MovementType::parse("out"), Some(MovementType::Out));
        assert_eq!(MovementType::parse("Ajuste"), Some(MovementType::Adjustment));
        assert_eq!(MovementType::parse("ADJUSTMENT"), Some(MovementType::Adjustment));
        assert_eq!(MovementType::parse("transfer"), None);
    }

    #[test]
    fn desserializa_forma_portuguesa() {
        let t: MovementType = serde_json::from_str("\"Ajuste\"").unwrap();
        assert_eq!(t, MovementType::Adjustment);
    }

    #[test]
    fn serializa_forma_canonica_em_ingles() {
        assert_eq!(serde_json::to_string(&MovementType::In).unwrap(), "\"in\"");
        assert_eq!(
            serde_json::to_string(&MovementType::Adjustment).unwrap(),
            "\"adjustment\""
        );
    }

    #[test]
    fn ajuste_e_set_absoluto_nao_delta() {
        assert_eq!(MovementType::In.apply(100, 50), 150);
        assert_eq!(MovementType::Out.apply(150, 30), 120);
        // O caso que diferencia Ajuste: 230 seria o resultado de um delta.
        assert_eq!(MovementType::Adjustment.apply(150, 80), 80);
        // Ajuste negativo define o saldo como o próprio valor negativo.
        assert_eq!(MovementType::Adjustment.apply(10, -3), -3);
    }
}
