//! Retrieval-augmented question answering over two document domains.
//!
//! A question is routed to the policy or resume domain, embedded, matched
//! against that domain's collection in the vector search service, and answered
//! from the retrieved chunks with citations.

pub mod classifier;
pub mod embeddings;
pub mod rag;
pub mod retriever;
pub mod types;
pub mod vector_index;
pub mod weaviate;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use classifier::{parse_classification, Classifier};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use rag::{
    assemble, AnswerGenerator, AnswerResult, Citation, PipelineFailure, PipelineOutcome,
    PipelineStage, RagPipeline, SearchHits,
};
pub use retriever::{CollectionMap, Retriever};
pub use types::{
    Category, Classification, Conversation, ConversationTurn, EmbeddingVector, RetrievedDocument,
    TurnRole,
};
pub use vector_index::{SearchRequest, VectorSearch};
pub use weaviate::WeaviateClient;
