pub mod activity_log;
pub mod auth;
pub mod bulk;
pub mod inventory;
pub mod movements;
pub mod settings;
pub mod tenancy;
pub mod users;
