use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// A taxonomia cobre: autenticação, acesso negado (papel ou escopo de
// empresa), não-encontrado dentro do escopo visível, validação, falha de
// armazenamento e falha de colaborador externo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Seleção vazia")]
    EmptySelection,

    #[error("Alvo inválido: {0}")]
    InvalidTarget(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("SKU já existe")]
    SkuAlreadyExists,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    AccessDenied,

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("Falha no colaborador externo: {0}")]
    CollaboratorError(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmptySelection => (
                StatusCode::BAD_REQUEST,
                "A seleção não pode ser vazia.".to_string(),
            ),
            AppError::InvalidTarget(what) => (
                StatusCode::BAD_REQUEST,
                format!("{} de destino inválida.", what),
            ),
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::SkuAlreadyExists => {
                (StatusCode::CONFLICT, "Este SKU já está em uso.".to_string())
            }
            AppError::UniqueConstraintViolation(c) => (
                StatusCode::CONFLICT,
                format!("Violação de unicidade: {}.", c),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "E-mail ou senha inválidos.".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::AccessDenied => (
                StatusCode::FORBIDDEN,
                "Você não tem permissão para realizar esta ação.".to_string(),
            ),
            AppError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                format!("{} não encontrado(a).", entity),
            ),
            AppError::CollaboratorError(detail) => {
                tracing::error!("Falha no colaborador externo: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    "O serviço externo não respondeu corretamente.".to_string(),
                )
            }

            // Todos os outros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
