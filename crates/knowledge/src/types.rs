//! Domain types shared by the answering pipeline.

use docroute_llm::ChatMessage;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric vector produced by the embedding service.
pub type EmbeddingVector = Vec<f32>;

/// Knowledge domain a question is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    PolicyDomain,
    ResumeDomain,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::PolicyDomain, Category::ResumeDomain];

    /// Label the classifier model is asked to emit.
    pub fn label(&self) -> &'static str {
        match self {
            Category::PolicyDomain => "Policy",
            Category::ResumeDomain => "Resume",
        }
    }

    /// Exact label match after trimming whitespace.
    pub fn from_label(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL.into_iter().find(|c| c.label() == trimmed)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Lenient parse for command-line input ("policy", "Resume", ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "policy" => Ok(Category::PolicyDomain),
            "resume" => Ok(Category::ResumeDomain),
            other => Err(format!(
                "unknown category '{}', expected 'policy' or 'resume'",
                other
            )),
        }
    }
}

/// Outcome of classifying a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Resolved(Category),
    /// The model answered with neither label; carries the raw reply for logging.
    Unresolved(String),
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One prior utterance in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }

    pub fn to_message(&self) -> ChatMessage {
        match self.role {
            TurnRole::User => ChatMessage::user(self.text.clone()),
            TurnRole::Assistant => ChatMessage::assistant(self.text.clone()),
        }
    }
}

/// Session-owned conversation history.
///
/// The pipeline only ever reads it through [`Conversation::turns`]; appending
/// happens between pipeline runs, by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Record one completed exchange.
    pub fn record_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(ConversationTurn::user(question));
        self.turns.push(ConversationTurn::assistant(answer));
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Properties requested from the search service for every record.
pub const DOCUMENT_FIELDS: &[&str] = &[
    "description",
    "instanceID",
    "requesterName",
    "requesterEmail",
    "pdfFileId",
    "content",
    "chunkIndex",
    "chunkCount",
    "source",
    "chunkId",
];

/// A document chunk returned by nearest-neighbor search.
///
/// Every property is optional on the wire; `distance` is always present
/// (lower is more relevant).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub description: Option<String>,
    #[serde(rename = "instanceID")]
    pub instance_id: Option<String>,
    #[serde(rename = "requesterName")]
    pub requester_name: Option<String>,
    #[serde(rename = "requesterEmail")]
    pub requester_email: Option<String>,
    #[serde(rename = "pdfFileId")]
    pub pdf_file_id: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "chunkIndex", default, deserialize_with = "lenient_int")]
    pub chunk_index: Option<i64>,
    #[serde(rename = "chunkCount", default, deserialize_with = "lenient_int")]
    pub chunk_count: Option<i64>,
    pub source: Option<String>,
    #[serde(rename = "chunkId", default, deserialize_with = "lenient_string")]
    pub chunk_id: Option<String>,
    pub distance: f64,
}

/// Accept integers, integral floats and numeric strings.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Some(i)),
            (None, Some(f)) if f.fract() == 0.0 => Ok(Some(f as i64)),
            _ => Err(D::Error::custom(format!("expected an integer, got {}", n))),
        },
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected an integer, got '{}'", s))),
        Some(other) => Err(D::Error::custom(format!("expected an integer, got {}", other))),
    }
}

/// Accept strings or numbers for identifier-like properties.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string identifier, got {}",
            other
        ))),
    }
}
