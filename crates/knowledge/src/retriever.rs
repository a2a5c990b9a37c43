//! Domain-scoped nearest-neighbor retrieval.

use crate::types::{Category, RetrievedDocument, DOCUMENT_FIELDS};
use crate::vector_index::{SearchRequest, VectorSearch};
use docroute_core::config::CollectionsConfig;
use docroute_core::{AppError, AppResult};
use std::sync::Arc;

/// Static mapping from category to collection name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMap {
    pub policy: String,
    pub resume: String,
}

impl CollectionMap {
    pub fn collection_for(&self, category: Category) -> &str {
        match category {
            Category::PolicyDomain => &self.policy,
            Category::ResumeDomain => &self.resume,
        }
    }
}

impl Default for CollectionMap {
    fn default() -> Self {
        Self::from(&CollectionsConfig::default())
    }
}

impl From<&CollectionsConfig> for CollectionMap {
    fn from(config: &CollectionsConfig) -> Self {
        Self {
            policy: config.policy.clone(),
            resume: config.resume.clone(),
        }
    }
}

/// Queries the collection mapped to a category.
pub struct Retriever {
    index: Arc<dyn VectorSearch>,
    collections: CollectionMap,
}

impl Retriever {
    pub fn new(index: Arc<dyn VectorSearch>, collections: CollectionMap) -> Self {
        Self { index, collections }
    }

    pub fn collections(&self) -> &CollectionMap {
        &self.collections
    }

    /// Return up to `top_k` documents, closest first, in the order the index
    /// ranked them.
    pub async fn retrieve(
        &self,
        vector: &[f32],
        category: Category,
        top_k: usize,
    ) -> AppResult<Vec<RetrievedDocument>> {
        if top_k == 0 {
            return Err(AppError::Validation("topK must be at least 1".to_string()));
        }

        let collection = self.collections.collection_for(category);
        let request = SearchRequest {
            collection,
            vector,
            limit: top_k,
            fields: DOCUMENT_FIELDS,
        };

        tracing::debug!(
            "Searching {} collection {} via {}",
            category,
            collection,
            self.index.backend_name()
        );

        let mut documents = self.index.near_vector(&request).await?;
        if documents.len() > top_k {
            tracing::warn!(
                "Search returned {} records for limit {}, truncating",
                documents.len(),
                top_k
            );
            documents.truncate(top_k);
        }

        tracing::info!(
            "Retrieved {} documents from {}",
            documents.len(),
            collection
        );

        Ok(documents)
    }
}
