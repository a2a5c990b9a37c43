//! Answer and citation types.

use serde::{Deserialize, Serialize};

/// Reply when the question could not be routed to a knowledge domain.
pub const CLARIFICATION_MESSAGE: &str = "I'm sorry, I'm having trouble understanding your request. Could you please rephrase it as a question about company policies or about finding a candidate from a resume?";

/// Reply when retrieval found nothing to ground an answer on.
pub const NO_RESULTS_MESSAGE: &str =
    "I couldn't find any information matching your question. Please try rephrasing it.";

/// Prefix of the reply rendered for a failed pipeline run.
pub const ERROR_MESSAGE_PREFIX: &str = "There was an error connecting to the knowledge base";

/// Where part of an answer came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based position of the document in the assembled context
    pub index: usize,

    /// Document description, or "Document {index}" when it has none
    pub title: String,

    /// Originating file or URL, when the record carries one
    pub source: Option<String>,
}

/// Terminal output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub citations: Vec<Citation>,
}

impl AnswerResult {
    pub fn new(answer: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            answer: answer.into(),
            citations,
        }
    }

    pub fn clarification() -> Self {
        Self::new(CLARIFICATION_MESSAGE, Vec::new())
    }

    pub fn no_results() -> Self {
        Self::new(NO_RESULTS_MESSAGE, Vec::new())
    }

    /// Error reply carrying only a human-readable summary.
    pub fn error(summary: &str) -> Self {
        Self::new(format!("{}: {}", ERROR_MESSAGE_PREFIX, summary), Vec::new())
    }
}
