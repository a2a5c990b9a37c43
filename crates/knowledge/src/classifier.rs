//! Question classifier.
//!
//! Routes a question to one of the two knowledge domains using the completion
//! service. A reply that is not exactly one of the labels is reported as
//! `Classification::Unresolved`; the classifier never guesses a default.

use crate::types::{Category, Classification, ConversationTurn};
use docroute_core::{AppError, AppResult};
use docroute_llm::{ChatMessage, LlmClient, LlmRequest};
use docroute_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Classification must be deterministic.
pub const CLASSIFY_TEMPERATURE: f32 = 0.0;

/// Classifies questions into a [`Category`].
pub struct Classifier {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl Classifier {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
        }
    }

    /// Build the completion request: system instructions, prior turns, then
    /// the current question as the final user message.
    pub fn build_request(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> AppResult<LlmRequest> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert(
            "policyLabel".to_string(),
            Category::PolicyDomain.label().to_string(),
        );
        variables.insert(
            "resumeLabel".to_string(),
            Category::ResumeDomain.label().to_string(),
        );

        let built = build_prompt(&self.prompt, variables)?;

        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(system) = built.system {
            messages.push(ChatMessage::system(system));
        }
        messages.extend(history.iter().map(ConversationTurn::to_message));
        messages.push(ChatMessage::user(built.user));

        Ok(LlmRequest::new(&self.model, messages).with_temperature(CLASSIFY_TEMPERATURE))
    }

    /// Classify a question, using the history only to disambiguate follow-ups.
    pub async fn classify(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> AppResult<Classification> {
        let request = self.build_request(question, history)?;
        let response = self.client.complete(&request).await?;

        let raw = response.first_content().ok_or_else(|| {
            AppError::Upstream("Classification response contained no choices".to_string())
        })?;

        let classification = parse_classification(raw);
        match &classification {
            Classification::Resolved(category) => {
                tracing::info!("Classified question as \"{}\"", category)
            }
            Classification::Unresolved(raw) => {
                tracing::warn!("Unexpected classification result: \"{}\"", raw)
            }
        }

        Ok(classification)
    }
}

/// Map a raw model reply onto a classification.
pub fn parse_classification(raw: &str) -> Classification {
    match Category::from_label(raw) {
        Some(category) => Classification::Resolved(category),
        None => Classification::Unresolved(raw.trim().to_string()),
    }
}
