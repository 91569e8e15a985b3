// src/models/bulk.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Ações administrativas aplicadas a um CONJUNTO de produtos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum BulkAction {
    ZeroStock,
    ClearMovements,
    DeleteProducts,
    UpdateImages,
    ChangeCategory,
}

// POST /api/bulk-operations. A seleção é por categorias, exceto
// change-category, que exige a lista explícita de produtos.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    pub action: BulkAction,

    #[serde(default)]
    pub category_ids: Vec<Uuid>,

    #[serde(default)]
    pub product_ids: Vec<Uuid>,

    pub target_category_id: Option<Uuid>,

    // Honrado apenas para SuperAdmin; os demais operam na própria empresa.
    pub company_id: Option<Uuid>,
}

// Contagens específicas de cada ação.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub action: BulkAction,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_movements: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_products: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<u64>,
}

impl BulkOutcome {
    pub fn new(action: BulkAction) -> Self {
        Self {
            action,
            affected: None,
            deleted_movements: None,
            deleted_products: None,
            updated: None,
            skipped: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acao_usa_kebab_case_na_superficie() {
        let a: BulkAction = serde_json::from_str("\"zero-stock\"").unwrap();
        assert_eq!(a, BulkAction::ZeroStock);
        assert_eq!(
            serde_json::to_string(&BulkAction::ChangeCategory).unwrap(),
            "\"change-category\""
        );
    }

    #[test]
    fn contagens_ausentes_nao_aparecem_no_json() {
        let mut outcome = BulkOutcome::new(BulkAction::ZeroStock);
        outcome.affected = Some(3);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["affected"], 3);
        assert!(json.get("deletedProducts").is_none());
    }
}
