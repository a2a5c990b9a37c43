//! Embedding provider implementations.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaEmbeddings;
pub use openai::OpenAiEmbeddings;
