//! Configuration management for docroute.
//!
//! Configuration is merged from, lowest precedence first:
//! - Built-in defaults
//! - The workspace config file (`.docroute/config.yaml`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::retry::RetryPolicy;

/// Name of the per-workspace configuration directory.
pub const CONFIG_DIR: &str = ".docroute";

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";

/// Default Ollama API base URL.
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .docroute/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider (e.g., "openai", "ollama")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// Embedding provider (e.g., "openai", "ollama")
    pub embedding_provider: String,

    /// Explicit API key for the completion/embedding provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Vector search settings
    pub search: SearchConfig,

    /// Retry policy for external calls
    pub retry: RetryPolicy,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(rename = "activeEmbeddingProvider")]
    pub active_embedding_provider: Option<String>,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        endpoint: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Built-in configuration for a known provider name.
    pub fn builtin(provider: &str) -> Option<Self> {
        match provider {
            "openai" => Some(Self::OpenAI {
                api_key_env: "OPENAI_API_KEY".to_string(),
                model: "gpt-4o".to_string(),
                embedding_model: Some("text-embedding-3-small".to_string()),
                endpoint: None,
                timeout: None,
            }),
            "ollama" => Some(Self::Ollama {
                endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
                model: "llama3.2".to_string(),
                embedding_model: Some("nomic-embed-text".to_string()),
                timeout: Some(60),
            }),
            _ => None,
        }
    }

    /// Completion model for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Embedding model for this provider, if configured.
    pub fn embedding_model(&self) -> Option<&str> {
        match self {
            Self::OpenAI {
                embedding_model, ..
            }
            | Self::Ollama {
                embedding_model, ..
            } => embedding_model.as_deref(),
        }
    }

    /// API base URL, falling back to the provider default.
    pub fn endpoint(&self) -> &str {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref().unwrap_or(DEFAULT_OPENAI_ENDPOINT),
            Self::Ollama { endpoint, .. } => endpoint,
        }
    }

    /// Request timeout in seconds, if configured.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            Self::OpenAI { timeout, .. } | Self::Ollama { timeout, .. } => *timeout,
        }
    }
}

/// Vector search (Weaviate) settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Base URL of the search service
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the search API key
    #[serde(rename = "apiKeyEnv", default = "default_search_api_key_env")]
    pub api_key_env: Option<String>,

    /// Number of nearest documents to retrieve per question
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,

    /// Vector dimension the index was built with
    #[serde(rename = "embeddingDim", default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Category to collection mapping
    #[serde(default)]
    pub collections: CollectionsConfig,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Static mapping from category to search collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionsConfig {
    #[serde(default = "default_policy_collection")]
    pub policy: String,

    #[serde(default = "default_resume_collection")]
    pub resume: String,
}

fn default_search_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_search_api_key_env() -> Option<String> {
    Some("WEAVIATE_API_KEY".to_string())
}

fn default_top_k() -> usize {
    5
}

fn default_embedding_dim() -> usize {
    1536
}

fn default_policy_collection() -> String {
    "TestPolicyUpload".to_string()
}

fn default_resume_collection() -> String {
    "ApplicantCV".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key_env: default_search_api_key_env(),
            top_k: default_top_k(),
            embedding_dim: default_embedding_dim(),
            collections: CollectionsConfig::default(),
            timeout: None,
        }
    }
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            policy: default_policy_collection(),
            resume: default_resume_collection(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    search: Option<SearchConfig>,
    retry: Option<RetryPolicy>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            embedding_provider: "openai".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            search: SearchConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, the config file and defaults.
    ///
    /// Environment variables:
    /// - `DOCROUTE_WORKSPACE`: Override workspace path
    /// - `DOCROUTE_CONFIG`: Path to config file
    /// - `DOCROUTE_PROVIDER`: Completion provider
    /// - `DOCROUTE_MODEL`: Completion model
    /// - `DOCROUTE_API_KEY`: API key
    /// - `WEAVIATE_ENDPOINT`: Search service base URL
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], but an explicit workspace or config file
    /// takes precedence over the environment.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| {
            std::env::var("DOCROUTE_WORKSPACE")
                .ok()
                .map(PathBuf::from)
        }) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| {
            std::env::var("DOCROUTE_CONFIG")
                .ok()
                .map(PathBuf::from)
        });

        config = config.load_file()?;
        config.apply_env();

        Ok(config)
    }

    /// Merge the config file (explicit or workspace default) if present.
    pub fn load_file(self) -> AppResult<Self> {
        if !self.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                self.workspace
            )));
        }

        let config_path = match self.config_file {
            Some(ref cf) => cf.clone(),
            None => self.config_dir().join("config.yaml"),
        };

        if config_path.exists() {
            self.merge_yaml(&config_path)
        } else if self.config_file.is_some() {
            Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )))
        } else {
            Ok(self)
        }
    }

    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("DOCROUTE_PROVIDER") {
            self.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCROUTE_MODEL") {
            self.model = model;
        }

        if let Ok(endpoint) = std::env::var("WEAVIATE_ENDPOINT") {
            self.search.endpoint = endpoint;
        }

        if let Ok(key) = std::env::var("DOCROUTE_API_KEY") {
            self.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self;

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(retry) = config_file.retry {
            result.retry = retry;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            result.embedding_provider = llm
                .active_embedding_provider
                .clone()
                .unwrap_or_else(|| llm.active_provider.clone());

            result.llm = Some(llm);

            // Listed providers win; otherwise fall back to the built-in model
            if let Some(provider_config) = result.provider_config(&result.provider) {
                result.model = provider_config.model().to_string();
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the environment and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            // A provider switch without an explicit model picks that provider's model
            if model.is_none() {
                if let Some(pc) = self.provider_config(&provider) {
                    self.model = pc.model().to_string();
                }
            }
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        // An explicit level wins; --verbose beats environment and file levels
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        } else if verbose {
            self.log_level = Some("debug".to_string());
        }
        self.verbose = self.verbose || verbose;

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .docroute directory.
    pub fn config_dir(&self) -> PathBuf {
        self.workspace.join(CONFIG_DIR)
    }

    /// Configuration for a provider: the config file entry, else the built-in one.
    pub fn provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
            .or_else(|| ProviderConfig::builtin(provider))
    }

    /// Embedding model for the active embedding provider.
    pub fn embedding_model(&self) -> AppResult<String> {
        self.provider_config(&self.embedding_provider)
            .and_then(|pc| pc.embedding_model().map(str::to_string))
            .ok_or_else(|| {
                AppError::Config(format!(
                    "No embedding model configured for provider '{}'",
                    self.embedding_provider
                ))
            })
    }

    /// Resolve the API key for a provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.provider_config(provider)? {
            ProviderConfig::OpenAI { api_key_env, .. } => std::env::var(&api_key_env).ok(),
            ProviderConfig::Ollama { .. } => None,
        }
    }

    /// Resolve the search service API key, if one is configured and set.
    pub fn resolve_search_api_key(&self) -> Option<String> {
        self.search
            .api_key_env
            .as_ref()
            .and_then(|env| std::env::var(env).ok())
            .filter(|key| !key.is_empty())
    }

    /// Validate configuration before any service is contacted.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["openai", "ollama"];

        for provider in [&self.provider, &self.embedding_provider] {
            if !known_providers.contains(&provider.as_str()) {
                return Err(AppError::Config(format!(
                    "Unknown provider: {}. Supported: {}",
                    provider,
                    known_providers.join(", ")
                )));
            }

            if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.provider_config(provider)
            {
                if self.api_key.is_none() && std::env::var(&api_key_env).is_err() {
                    return Err(AppError::Config(format!(
                        "API key not found in environment variable: {}",
                        api_key_env
                    )));
                }
            }
        }

        if self.search.top_k == 0 {
            return Err(AppError::Config("search.topK must be at least 1".to_string()));
        }

        if self.search.embedding_dim == 0 {
            return Err(AppError::Config(
                "search.embeddingDim must be at least 1".to_string(),
            ));
        }

        for name in [&self.search.collections.policy, &self.search.collections.resume] {
            if !is_valid_class_name(name) {
                return Err(AppError::Config(format!(
                    "Invalid collection name '{}': must start with a letter and contain only letters, digits or '_'",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Collection names are interpolated into the search query, so they must be
/// plain GraphQL identifiers.
pub fn is_valid_class_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
