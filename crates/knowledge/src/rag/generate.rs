//! Grounded answer generation.

use crate::types::ConversationTurn;
use docroute_core::{AppError, AppResult};
use docroute_llm::{ChatMessage, LlmClient, LlmRequest};
use docroute_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Low but non-zero: natural phrasing while staying on the context.
pub const ANSWER_TEMPERATURE: f32 = 0.2;

/// Produces the final answer from assembled context.
pub struct AnswerGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl AnswerGenerator {
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

    /// System instruction, the full history in order, then one user turn
    /// carrying the question and the context.
    pub fn build_request(
        &self,
        context: &str,
        question: &str,
        history: &[ConversationTurn],
    ) -> AppResult<LlmRequest> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("context".to_string(), context.to_string());

        let built = build_prompt(&self.prompt, variables)?;

        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(system) = built.system {
            messages.push(ChatMessage::system(system));
        }
        messages.extend(history.iter().map(ConversationTurn::to_message));
        messages.push(ChatMessage::user(built.user));

        Ok(LlmRequest::new(&self.model, messages).with_temperature(ANSWER_TEMPERATURE))
    }

    pub async fn generate(
        &self,
        context: &str,
        question: &str,
        history: &[ConversationTurn],
    ) -> AppResult<String> {
        let request = self.build_request(context, question, history)?;

        tracing::debug!(
            "Generating answer with {} ({} history turns, {} context bytes)",
            self.client.provider_name(),
            history.len(),
            context.len()
        );

        let response = self.client.complete(&request).await?;

        let answer = response
            .first_content()
            .ok_or_else(|| {
                AppError::Upstream("Answer response contained no choices".to_string())
            })?
            .trim();

        if answer.is_empty() {
            return Err(AppError::Upstream(
                "Answer response contained no usable content".to_string(),
            ));
        }

        tracing::info!("Generated answer ({} chars)", answer.len());
        Ok(answer.to_string())
    }
}
