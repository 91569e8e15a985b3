// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

use crate::{
    db::{
        AuditRepository, CompanyRepository, InventoryRepository, MovementRepository,
        SettingsRepository, UserRepository,
    },
    services::{
        AuditService, AuthService, BulkService, CompanyService, HttpImageSearch,
        InventoryService, LedgerService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub inventory_service: InventoryService,
    pub ledger_service: LedgerService,
    pub company_service: CompanyService,
    pub audit_service: AuditService,
    pub bulk_service: BulkService,
    pub user_repo: UserRepository,
    pub settings_repo: SettingsRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let movement_repo = MovementRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());

        let audit_service = AuditService::new(audit_repo);
        let auth_service = AuthService::new(
            user_repo.clone(),
            audit_service.clone(),
            jwt_secret.clone(),
            db_pool.clone(),
        );
        let inventory_service = InventoryService::new(
            inventory_repo.clone(),
            audit_service.clone(),
            db_pool.clone(),
        );
        let ledger_service = LedgerService::new(
            movement_repo.clone(),
            inventory_repo.clone(),
            audit_service.clone(),
            db_pool.clone(),
        );
        let company_service = CompanyService::new(
            company_repo,
            audit_service.clone(),
            db_pool.clone(),
        );
        let bulk_service = BulkService::new(
            inventory_repo,
            movement_repo,
            settings_repo.clone(),
            audit_service.clone(),
            Arc::new(HttpImageSearch::new()),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            inventory_service,
            ledger_service,
            company_service,
            audit_service,
            bulk_service,
            user_repo,
            settings_repo,
        })
    }
}
