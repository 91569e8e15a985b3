// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::Role,
};

// O contexto resolvido da sessão: quem é o usuário, qual o seu papel e a
// qual empresa ele pertence. Todos os outros componentes recebem isto
// como parâmetro explícito; nenhum componente lê estado ambiente.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub role: Role,
    pub company_id: Uuid,
}

impl RequestContext {
    /// Escopo de empresa para as queries: `None` significa "sem filtro"
    /// e só acontece para SuperAdmin.
    pub fn scope(&self) -> Option<Uuid> {
        if self.role.is_super_admin() {
            None
        } else {
            Some(self.company_id)
        }
    }
}

// Metadados do cliente para a trilha de auditoria.
#[derive(Debug, Clone)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientMeta {
    fn from_headers(headers: &HeaderMap) -> Self {
        let ip_address = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string());

        let user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        Self { ip_address, user_agent }
    }
}

// O middleware em si: valida o Bearer token, carrega o usuário e insere o
// contexto nos "extensions" da requisição. Falha FECHADO: sem contexto
// resolvido, nenhum handler toca em dados.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;

    let user = app_state.auth_service.validate_token(bearer.token()).await?;

    let context = RequestContext {
        user_id: user.id,
        role: user.role,
        company_id: user.company_id,
    };
    let meta = ClientMeta::from_headers(request.headers());

    request.extensions_mut().insert(context);
    request.extensions_mut().insert(meta);
    Ok(next.run(request).await)
}

// Extrator para obter o contexto resolvido diretamente nos handlers
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .copied()
            .ok_or(AppError::InvalidToken)
    }
}

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ClientMeta>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}
