// src/services/image_search.rs

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::common::error::AppError;

// Tempo máximo por consulta. Uma busca lenta vira "skipped" no lote,
// nunca derruba os demais itens.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Colaborador externo de busca de imagens. Atrás de trait para o motor
/// de lote depender só do contrato (e os testes poderem substituí-lo).
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Devolve a URL da primeira imagem encontrada, ou None se o serviço
    /// não tiver resultado para a consulta.
    async fn find_image(
        &self,
        endpoint: &str,
        api_key: &str,
        query: &str,
    ) -> Result<Option<String>, AppError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    url: String,
}

pub struct HttpImageSearch {
    client: reqwest::Client,
}

impl HttpImageSearch {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .expect("Falha ao construir o cliente HTTP de busca de imagens");
        Self { client }
    }
}

impl Default for HttpImageSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSearch for HttpImageSearch {
    async fn find_image(
        &self,
        endpoint: &str,
        api_key: &str,
        query: &str,
    ) -> Result<Option<String>, AppError> {
        let response = self
            .client
            .get(endpoint)
            .query(&[("q", query), ("key", api_key), ("limit", "1")])
            .send()
            .await
            .map_err(|e| AppError::CollaboratorError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::CollaboratorError(format!(
                "busca de imagens respondeu {}",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::CollaboratorError(e.to_string()))?;

        Ok(body.results.into_iter().next().map(|hit| hit.url))
    }
}
