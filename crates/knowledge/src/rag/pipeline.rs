//! Pipeline orchestration.
//!
//! One run walks `Received -> Classifying -> Embedding -> Retrieving ->
//! Assembling -> Generating` strictly in sequence. Two outcomes end the run
//! early without being errors: an unresolved classification (nothing else is
//! called) and an empty retrieval (the generator is not called).

use super::context::assemble;
use super::generate::AnswerGenerator;
use super::types::AnswerResult;
use crate::classifier::Classifier;
use crate::embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
use crate::retriever::{CollectionMap, Retriever};
use crate::types::{Category, Classification, ConversationTurn, RetrievedDocument};
use crate::weaviate::WeaviateClient;
use docroute_core::{AppConfig, AppError, AppResult, RetryPolicy};
use docroute_llm::create_client;
use docroute_prompt::{load_prompt, ANSWER_PROMPT_ID, CLASSIFY_PROMPT_ID};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Stage of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Classifying,
    Embedding,
    Retrieving,
    Assembling,
    Generating,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Classifying => "classifying",
            PipelineStage::Embedding => "embedding",
            PipelineStage::Retrieving => "retrieving",
            PipelineStage::Assembling => "assembling",
            PipelineStage::Generating => "generating",
        };
        f.write_str(name)
    }
}

/// Successful end states of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Answered {
        category: Category,
        result: AnswerResult,
    },
    /// The question matched neither knowledge domain.
    Unresolved,
    /// The domain's collection had nothing close to the question.
    NoResults { category: Category },
}

impl PipelineOutcome {
    pub fn category(&self) -> Option<Category> {
        match self {
            PipelineOutcome::Answered { category, .. }
            | PipelineOutcome::NoResults { category } => Some(*category),
            PipelineOutcome::Unresolved => None,
        }
    }

    pub fn into_answer(self) -> AnswerResult {
        match self {
            PipelineOutcome::Answered { result, .. } => result,
            PipelineOutcome::Unresolved => AnswerResult::clarification(),
            PipelineOutcome::NoResults { .. } => AnswerResult::no_results(),
        }
    }
}

/// A failed run: the stage that failed and the error it failed with.
#[derive(Debug, Error)]
#[error("pipeline failed while {stage}: {error}")]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    #[source]
    pub error: AppError,
}

impl PipelineFailure {
    fn at(stage: PipelineStage) -> impl FnOnce(AppError) -> Self {
        move |error| Self { stage, error }
    }

    /// User-visible reply; carries only the error's summary.
    pub fn to_answer(&self) -> AnswerResult {
        AnswerResult::error(self.error.user_summary())
    }
}

/// Documents found for a query, without generation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHits {
    pub category: Category,
    pub collection: String,
    pub documents: Vec<RetrievedDocument>,
}

/// The answering pipeline. Stateless between runs: history is supplied by the
/// caller on every call and only read.
pub struct RagPipeline {
    classifier: Classifier,
    embedder: Arc<dyn EmbeddingProvider>,
    retriever: Retriever,
    generator: AnswerGenerator,
    top_k: usize,
    retry: RetryPolicy,
}

impl RagPipeline {
    pub fn new(
        classifier: Classifier,
        embedder: Arc<dyn EmbeddingProvider>,
        retriever: Retriever,
        generator: AnswerGenerator,
    ) -> Self {
        Self {
            classifier,
            embedder,
            retriever,
            generator,
            top_k: 5,
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Wire the pipeline to the services named in the configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let provider_config = config.provider_config(&config.provider);
        let api_key = config.resolve_api_key(&config.provider);

        let client = create_client(
            &config.provider,
            provider_config.as_ref().map(|pc| pc.endpoint()),
            api_key.as_deref(),
            provider_config
                .as_ref()
                .and_then(|pc| pc.timeout())
                .map(Duration::from_secs),
        )
        .map_err(|e| AppError::Config(format!("Failed to create LLM client: {}", e)))?;

        let classifier = Classifier::new(
            client.clone(),
            &config.model,
            load_prompt(&config.workspace, CLASSIFY_PROMPT_ID)?,
        );
        let generator = AnswerGenerator::new(
            client,
            &config.model,
            load_prompt(&config.workspace, ANSWER_PROMPT_ID)?,
        );

        let embedding_config = EmbeddingConfig::from_app_config(config)?;
        let embedder = create_provider(
            &embedding_config,
            config.resolve_api_key(&config.embedding_provider).as_deref(),
        )?;

        let mut index =
            WeaviateClient::new(&config.search.endpoint, config.resolve_search_api_key());
        if let Some(timeout) = config.search.timeout {
            index = index.with_timeout(Duration::from_secs(timeout))?;
        }
        let retriever = Retriever::new(
            Arc::new(index),
            CollectionMap::from(&config.search.collections),
        );

        tracing::debug!(
            "Pipeline ready: completion={} ({}), embeddings={} ({}), search={}",
            config.provider,
            config.model,
            embedding_config.provider,
            embedding_config.model,
            config.search.endpoint
        );

        Ok(Self::new(classifier, embedder, retriever, generator)
            .with_top_k(config.search.top_k)
            .with_retry(config.retry))
    }

    /// Run the pipeline for one question.
    pub async fn run(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<PipelineOutcome, PipelineFailure> {
        let question =
            validate_question(question).map_err(PipelineFailure::at(PipelineStage::Received))?;
        tracing::debug!(stage = %PipelineStage::Received, "Question: {}", question);

        let category = match self.classify(question, history).await? {
            Classification::Resolved(category) => category,
            Classification::Unresolved(_) => return Ok(PipelineOutcome::Unresolved),
        };

        let documents = self.find_documents(question, category, self.top_k).await?;
        if documents.is_empty() {
            tracing::info!("No documents found in {} collection", category);
            return Ok(PipelineOutcome::NoResults { category });
        }

        tracing::debug!(
            stage = %PipelineStage::Assembling,
            "Assembling {} documents",
            documents.len()
        );
        let assembled = assemble(&documents);

        tracing::debug!(stage = %PipelineStage::Generating, "Generating answer");
        let generator = &self.generator;
        let context = assembled.text.as_str();
        let answer = self
            .retry
            .run("answer generation", move || {
                generator.generate(context, question, history)
            })
            .await
            .map_err(PipelineFailure::at(PipelineStage::Generating))?;

        Ok(PipelineOutcome::Answered {
            category,
            result: AnswerResult::new(answer, assembled.citations),
        })
    }

    /// Run the pipeline and render every outcome, failures included, as an
    /// answer the caller can show.
    pub async fn respond(&self, question: &str, history: &[ConversationTurn]) -> AnswerResult {
        match self.run(question, history).await {
            Ok(outcome) => outcome.into_answer(),
            Err(failure) => {
                tracing::error!("{}", failure);
                failure.to_answer()
            }
        }
    }

    /// Retrieval only. Classifies when no category is given; `Ok(None)` means
    /// the question could not be routed.
    pub async fn search(
        &self,
        query: &str,
        category: Option<Category>,
        top_k: Option<usize>,
    ) -> Result<Option<SearchHits>, PipelineFailure> {
        let query = validate_question(query).map_err(PipelineFailure::at(PipelineStage::Received))?;

        let category = match category {
            Some(category) => category,
            None => match self.classify(query, &[]).await? {
                Classification::Resolved(category) => category,
                Classification::Unresolved(_) => return Ok(None),
            },
        };

        let documents = self
            .find_documents(query, category, top_k.unwrap_or(self.top_k))
            .await?;

        Ok(Some(SearchHits {
            category,
            collection: self
                .retriever
                .collections()
                .collection_for(category)
                .to_string(),
            documents,
        }))
    }

    async fn classify(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<Classification, PipelineFailure> {
        tracing::debug!(stage = %PipelineStage::Classifying, "Classifying question");
        let classifier = &self.classifier;
        self.retry
            .run("classification", move || classifier.classify(question, history))
            .await
            .map_err(PipelineFailure::at(PipelineStage::Classifying))
    }

    async fn find_documents(
        &self,
        question: &str,
        category: Category,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, PipelineFailure> {
        tracing::debug!(
            stage = %PipelineStage::Embedding,
            "Embedding question with {}",
            self.embedder.model_name()
        );
        let embedder = &self.embedder;
        let vector = self
            .retry
            .run("embedding", move || embedder.embed(question))
            .await
            .map_err(PipelineFailure::at(PipelineStage::Embedding))?;
        tracing::info!("Embedded question ({} dimensions)", vector.len());
        tracing::trace!("Query vector: {:?}", vector);

        tracing::debug!(stage = %PipelineStage::Retrieving, "Retrieving from {} domain", category);
        let retriever = &self.retriever;
        let vector = vector.as_slice();
        self.retry
            .run("retrieval", move || retriever.retrieve(vector, category, top_k))
            .await
            .map_err(PipelineFailure::at(PipelineStage::Retrieving))
    }
}

fn validate_question(question: &str) -> AppResult<&str> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Question must not be empty".to_string()));
    }
    Ok(trimmed)
}
