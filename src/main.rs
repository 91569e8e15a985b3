//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não
    // deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas (apenas login)
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Tudo abaixo exige contexto resolvido: o auth_guard falha fechado
    // com 401 antes de qualquer acesso a dados.
    let api_routes = Router::new()
        .route(
            "/products",
            post(handlers::inventory::create_product).get(handlers::inventory::list_products),
        )
        .route(
            "/products/{id}",
            get(handlers::inventory::get_product)
                .put(handlers::inventory::update_product)
                .delete(handlers::inventory::delete_product),
        )
        .route(
            "/categories",
            post(handlers::inventory::create_category).get(handlers::inventory::list_categories),
        )
        .route(
            "/categories/{id}",
            get(handlers::inventory::get_category)
                .put(handlers::inventory::update_category)
                .delete(handlers::inventory::delete_category),
        )
        .route(
            "/suppliers",
            post(handlers::inventory::create_supplier).get(handlers::inventory::list_suppliers),
        )
        .route(
            "/suppliers/{id}",
            get(handlers::inventory::get_supplier)
                .put(handlers::inventory::update_supplier)
                .delete(handlers::inventory::delete_supplier),
        )
        .route(
            "/stock-movements",
            post(handlers::movements::create_movement).get(handlers::movements::list_movements),
        )
        .route(
            "/stock/reconciliation",
            get(handlers::movements::reconcile_report)
                .post(handlers::movements::reconcile_confirm),
        )
        .route(
            "/users",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route("/users/me", get(handlers::auth::get_me))
        .route("/users/me/password", put(handlers::users::change_my_password))
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route(
            "/companies",
            post(handlers::tenancy::create_company).get(handlers::tenancy::list_companies),
        )
        .route(
            "/companies/{id}",
            get(handlers::tenancy::get_company)
                .put(handlers::tenancy::update_company)
                .delete(handlers::tenancy::delete_company),
        )
        .route("/activity-log", get(handlers::activity_log::query_activity_log))
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route(
            "/company-settings",
            get(handlers::settings::get_company_settings)
                .put(handlers::settings::update_company_settings),
        )
        .route("/bulk-operations", post(handlers::bulk::run_bulk_operation))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
