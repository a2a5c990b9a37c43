//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::providers::{OllamaEmbeddings, OpenAiEmbeddings};
use crate::types::EmbeddingVector;
use docroute_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding providers.
///
/// Failures (transport, non-success status, missing vector field, wrong
/// dimension) are reported as `AppError::Upstream`. There is no caching:
/// every call goes to the service.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "openai", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Embed a single non-empty text.
    async fn embed(&self, text: &str) -> AppResult<EmbeddingVector>;
}

/// Reject vectors that cannot be searched against the index.
pub(crate) fn ensure_dimensions(
    model: &str,
    embedding: EmbeddingVector,
    expected: usize,
) -> AppResult<EmbeddingVector> {
    if embedding.len() != expected {
        return Err(AppError::Upstream(format!(
            "Embedding model '{}' returned {} dimensions, expected {}",
            model,
            embedding.len(),
            expected
        )));
    }
    Ok(embedding)
}

/// Create an embedding provider based on configuration.
pub fn create_provider(
    config: &EmbeddingConfig,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let timeout = config.timeout.map(Duration::from_secs);

    match config.provider.as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI embedding provider requires API key".to_string())
            })?;
            let mut provider = OpenAiEmbeddings::new(config, api_key);
            if let Some(timeout) = timeout {
                provider = provider.with_timeout(timeout)?;
            }
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let mut provider = OllamaEmbeddings::new(config);
            if let Some(timeout) = timeout {
                provider = provider.with_timeout(timeout)?;
            }
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, ollama",
            config.provider
        ))),
    }
}
