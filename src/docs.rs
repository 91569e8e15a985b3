// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Inventory ---
        handlers::inventory::create_product,
        handlers::inventory::list_products,

        // --- Stock Ledger ---
        handlers::movements::list_movements,
        handlers::movements::create_movement,
        handlers::movements::reconcile_report,
        handlers::movements::reconcile_confirm,

        // --- Audit ---
        handlers::activity_log::query_activity_log,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::settings::get_company_settings,
        handlers::settings::update_company_settings,

        // --- Bulk ---
        handlers::bulk::run_bulk_operation,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Tenancy ---
            models::tenancy::Company,

            // --- Inventory ---
            models::inventory::Product,
            models::inventory::Category,
            models::inventory::Supplier,
            models::inventory::MovementType,
            models::inventory::StockMovement,
            models::inventory::ReconciliationReport,

            // --- Audit ---
            models::audit::AuditAction,
            models::audit::ActivityLog,

            // --- Settings ---
            models::settings::Setting,
            models::settings::UpdateSettingsRequest,
            models::settings::SettingsUpdateResult,

            // --- Bulk ---
            models::bulk::BulkAction,
            models::bulk::BulkRequest,
            models::bulk::BulkOutcome,

            // --- Payloads ---
            handlers::inventory::CreateProductPayload,
            handlers::inventory::UpdateProductPayload,
            handlers::inventory::CategoryPayload,
            handlers::inventory::SupplierPayload,
            handlers::movements::CreateMovementPayload,
            handlers::movements::ReconciliationConfirmPayload,
            handlers::users::CreateUserPayload,
            handlers::users::UpdateUserPayload,
            handlers::users::ChangePasswordPayload,
            handlers::tenancy::CompanyPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação"),
        (name = "Inventory", description = "Catálogo: produtos, categorias e fornecedores"),
        (name = "Stock Ledger", description = "Movimentações de estoque e reconciliação"),
        (name = "Audit", description = "Trilha de auditoria"),
        (name = "Settings", description = "Configurações de sistema e de empresa"),
        (name = "Bulk", description = "Ações administrativas em lote")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
