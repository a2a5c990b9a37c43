//! Weaviate vector search client (GraphQL `Get` with `nearVector`).

use crate::types::RetrievedDocument;
use crate::vector_index::{SearchRequest, VectorSearch};
use docroute_core::config::is_valid_class_name;
use docroute_core::{AppError, AppResult};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Raw record as returned under `data.Get.<Class>`.
#[derive(Debug, Deserialize)]
struct WeaviateRecord {
    #[serde(flatten)]
    properties: serde_json::Map<String, Value>,
    #[serde(rename = "_additional", default)]
    additional: Option<Additional>,
}

#[derive(Debug, Deserialize)]
struct Additional {
    #[serde(default)]
    distance: Option<f64>,
}

/// Weaviate GraphQL client.
pub struct WeaviateClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeaviateClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
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

    /// Render the GraphQL query for a search request.
    pub fn build_query(request: &SearchRequest<'_>) -> AppResult<String> {
        if !is_valid_class_name(request.collection) {
            return Err(AppError::Retrieval(format!(
                "Invalid collection name '{}'",
                request.collection
            )));
        }

        let vector = serde_json::to_string(request.vector)?;
        let fields = request.fields.join(" ");

        Ok(format!(
            concat!(
                "{{ Get {{ {class}(nearVector: {{ vector: {vector} }}, limit: {limit}) ",
                "{{ {fields} _additional {{ distance }} }} }} }}"
            ),
            class = request.collection,
            vector = vector,
            limit = request.limit,
            fields = fields,
        ))
    }

    /// Extract documents for `collection` from a GraphQL response body.
    pub fn parse_response(collection: &str, body: Value) -> AppResult<Vec<RetrievedDocument>> {
        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            return Err(AppError::Retrieval(format!(
                "Weaviate search failed: {}",
                errors
            )));
        }

        let records = body
            .get("data")
            .and_then(|d| d.get("Get"))
            .and_then(|g| g.as_object())
            .and_then(|g| g.get(collection))
            .ok_or_else(|| {
                AppError::Retrieval(format!(
                    "Weaviate response is missing data.Get.{}",
                    collection
                ))
            })?;

        if records.is_null() {
            return Ok(Vec::new());
        }

        let records: Vec<WeaviateRecord> = serde_json::from_value(records.clone())
            .map_err(|e| AppError::Retrieval(format!("Malformed Weaviate records: {}", e)))?;

        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| record.into_document(i))
            .collect()
    }
}

impl WeaviateRecord {
    fn into_document(self, position: usize) -> AppResult<RetrievedDocument> {
        let distance = self
            .additional
            .and_then(|a| a.distance)
            .ok_or_else(|| {
                AppError::Retrieval(format!("Record {} has no distance", position + 1))
            })?;

        let mut properties = self.properties;
        properties.insert("distance".to_string(), Value::from(distance));

        serde_json::from_value(Value::Object(properties)).map_err(|e| {
            AppError::Retrieval(format!("Malformed record {}: {}", position + 1, e))
        })
    }
}

#[async_trait::async_trait]
impl VectorSearch for WeaviateClient {
    fn backend_name(&self) -> &str {
        "weaviate"
    }

    async fn near_vector(&self, request: &SearchRequest<'_>) -> AppResult<Vec<RetrievedDocument>> {
        let query = Self::build_query(request)?;
        let url = format!("{}/v1/graphql", self.base_url);

        tracing::debug!(
            "Querying Weaviate class {} (limit {}, vector length {})",
            request.collection,
            request.limit,
            request.vector.len()
        );

        let mut http_request = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "query": query }));

        if let Some(ref key) = self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to reach Weaviate: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Retrieval(format!(
                "Weaviate API error ({}): {}",
                status, error_text
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to parse Weaviate response: {}", e)))?;

        Self::parse_response(request.collection, body)
    }
}
