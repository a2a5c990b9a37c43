//! Ollama embedding provider (`/api/embeddings`).
//!
//! Local embeddings via models like nomic-embed-text.

use crate::embeddings::provider::ensure_dimensions;
use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use crate::types::EmbeddingVector;
use async_trait::async_trait;
use docroute_core::config::DEFAULT_OLLAMA_ENDPOINT;
use docroute_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Ollama embedding provider using the local API
#[derive(Debug, Clone)]
pub struct OllamaEmbeddings {
    /// HTTP client for API requests
    client: Client,
    /// Ollama API base URL
    base_url: String,
    /// Model name (e.g., "nomic-embed-text")
    model: String,
    /// Expected embedding dimensions
    dimensions: usize,
}

/// Request payload for Ollama embeddings API
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response from Ollama embeddings API
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

/// Error response from Ollama API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaEmbeddings {
    pub fn new(config: &EmbeddingConfig) -> Self {
        let base_url = config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_OLLAMA_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::new(),
            base_url,
            model: config.model.clone(),
            dimensions: config.dimensions,
        }
    }

    /// Abort requests that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;
        Ok(self)
    }

    fn extract_embedding(&self, body: EmbeddingResponse) -> AppResult<EmbeddingVector> {
        let embedding = body.embedding.filter(|e| !e.is_empty()).ok_or_else(|| {
            AppError::Upstream("Ollama response did not contain an embedding".to_string())
        })?;

        ensure_dimensions(&self.model, embedding, self.dimensions)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(
        skip(self, text),
        fields(text_len = text.len(), provider = "ollama", model = %self.model)
    )]
    async fn embed(&self, text: &str) -> AppResult<EmbeddingVector> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to send request to Ollama: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                return Err(AppError::Upstream(format!(
                    "Ollama API error ({}): {}",
                    status, error_response.error
                )));
            }

            return Err(AppError::Upstream(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Ollama response: {}", e)))?;

        let embedding = self.extract_embedding(body)?;
        debug!("Successfully generated {} dimensional embedding", embedding.len());

        Ok(embedding)
    }
}
