pub mod audit_service;
pub use audit_service::AuditService;
pub mod auth;
pub use auth::AuthService;
pub mod bulk_service;
pub use bulk_service::BulkService;
pub mod image_search;
pub use image_search::{HttpImageSearch, ImageSearch};
pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod ledger_service;
pub use ledger_service::LedgerService;
pub mod tenancy_service;
pub use tenancy_service::CompanyService;
