//! Embedding configuration.

use docroute_core::{AppConfig, AppResult};
use serde::{Deserialize, Serialize};

/// Settings for the embedding service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "openai", "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Dimension the vector index was built with
    pub dimensions: usize,

    /// API base URL override
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            endpoint: None,
            timeout: None,
        }
    }
}

impl EmbeddingConfig {
    /// Derive embedding settings from the application config.
    ///
    /// The dimension comes from the search section: vectors must match the index.
    pub fn from_app_config(config: &AppConfig) -> AppResult<Self> {
        let provider_config = config.provider_config(&config.embedding_provider);

        Ok(Self {
            provider: config.embedding_provider.clone(),
            model: config.embedding_model()?,
            dimensions: config.search.embedding_dim,
            endpoint: provider_config
                .as_ref()
                .map(|pc| pc.endpoint().to_string()),
            timeout: provider_config.as_ref().and_then(|pc| pc.timeout()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "text-embedding-3-small");
        assert_eq!(config.dimensions, 1536);
    }

    #[test]
    fn test_from_app_config() {
        let mut app = AppConfig::default();
        app.embedding_provider = "ollama".to_string();
        app.search.embedding_dim = 768;

        let config = EmbeddingConfig::from_app_config(&app).unwrap();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "nomic-embed-text");
        assert_eq!(config.dimensions, 768);
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:11434"));
    }
}
