//! Vector search abstraction.
//!
//! The index itself lives in an external service; this trait is the seam the
//! retriever queries through.

use crate::types::RetrievedDocument;
use docroute_core::AppResult;

/// A nearest-neighbor query scoped to one collection.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    /// Collection to search; never more than one per query
    pub collection: &'a str,
    /// Query vector
    pub vector: &'a [f32],
    /// Maximum number of records to return
    pub limit: usize,
    /// Properties to return for each record
    pub fields: &'a [&'a str],
}

/// Trait for vector search backends.
#[async_trait::async_trait]
pub trait VectorSearch: Send + Sync {
    /// Backend name for logging (e.g., "weaviate").
    fn backend_name(&self) -> &str;

    /// Return up to `limit` records ordered by ascending distance, as ranked
    /// by the backend. An empty collection yields an empty vector, not an error.
    async fn near_vector(&self, request: &SearchRequest<'_>) -> AppResult<Vec<RetrievedDocument>>;
}
