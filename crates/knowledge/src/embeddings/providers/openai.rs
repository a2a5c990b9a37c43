//! OpenAI embedding provider (`/v1/embeddings`).

use crate::embeddings::provider::ensure_dimensions;
use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use crate::types::EmbeddingVector;
use async_trait::async_trait;
use docroute_core::config::DEFAULT_OPENAI_ENDPOINT;
use docroute_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI embedding provider.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddings {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

/// Request payload for the embeddings API
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response from the embeddings API
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    pub fn new(config: &EmbeddingConfig, api_key: impl Into<String>) -> Self {
        let base_url = config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        }
    }

    /// Abort requests that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    fn extract_embedding(&self, body: EmbeddingResponse) -> AppResult<EmbeddingVector> {
        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                AppError::Upstream(
                    "Invalid response from OpenAI API: no embedding data found".to_string(),
                )
            })?;

        ensure_dimensions(&self.model, embedding, self.dimensions)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(
        skip(self, text),
        fields(text_len = text.len(), provider = "openai", model = %self.model)
    )]
    async fn embed(&self, text: &str) -> AppResult<EmbeddingVector> {
        let url = format!("{}/v1/embeddings", self.base_url);

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to send request to OpenAI: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upstream(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse OpenAI response: {}", e)))?;

        let embedding = self.extract_embedding(body)?;
        debug!("Generated {} dimensional embedding", embedding.len());

        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(dimensions: usize) -> OpenAiEmbeddings {
        let config = EmbeddingConfig {
            dimensions,
            endpoint: Some("https://proxy.internal/".to_string()),
            ..EmbeddingConfig::default()
        };
        OpenAiEmbeddings::new(&config, "sk-test")
    }

    #[test]
    fn test_endpoint_normalized() {
        assert_eq!(provider(3).base_url, "https://proxy.internal");
    }

    #[test]
    fn test_request_body_shape() {
        let json = serde_json::to_value(EmbeddingRequest {
            model: "text-embedding-3-small",
            input: "What is the dental benefit?",
        })
        .unwrap();
        assert_eq!(json["model"], "text-embedding-3-small");
        assert_eq!(json["input"], "What is the dental benefit?");
    }

    #[test]
    fn test_extract_embedding() {
        let body: EmbeddingResponse = serde_json::from_str(
            r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,-0.2,0.3]}],"model":"text-embedding-3-small"}"#,
        )
        .unwrap();

        assert_eq!(provider(3).extract_embedding(body).unwrap(), vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_missing_data_is_upstream_error() {
        let body: EmbeddingResponse = serde_json::from_str(r#"{"object":"list"}"#).unwrap();
        assert!(matches!(
            provider(3).extract_embedding(body),
            Err(AppError::Upstream(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch_is_upstream_error() {
        let body: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"embedding":[0.1,0.2]}]}"#).unwrap();
        assert!(matches!(
            provider(3).extract_embedding(body),
            Err(AppError::Upstream(_))
        ));
    }
}
