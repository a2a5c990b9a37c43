//! Error types for docroute.
//!
//! A single enum covers every failure category. The three pipeline categories
//! map one-to-one onto what a caller can act on: bad input (`Validation`), the
//! language-model service (`Upstream`), and the vector search service
//! (`Retrieval`).

use thiserror::Error;

/// Unified error type for docroute.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected input, raised before any external call is made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Embedding or completion service failed or returned nothing usable
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Vector search service failed or returned a malformed response
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Prompt loading or rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Short, human-readable summary safe to show to an end user.
    ///
    /// Upstream payloads (status bodies, raw JSON) are never included.
    pub fn user_summary(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "the question was empty or invalid",
            AppError::Upstream(_) => "the language model service did not return a usable response",
            AppError::Retrieval(_) => {
                "the document search service did not return a usable response"
            }
            AppError::Config(_) => "the assistant is not configured correctly",
            AppError::Prompt(_) => "the assistant's instructions could not be prepared",
            AppError::Io(_) | AppError::Serialization(_) | AppError::Other(_) => {
                "an unexpected internal error occurred"
            }
        }
    }

    /// Whether an operation failing with this error may be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Upstream(_) | AppError::Retrieval(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_summary_hides_payload() {
        let err = AppError::Upstream("500 Internal Server Error - {\"secret\":\"x\"}".to_string());
        assert!(!err.user_summary().contains("secret"));
        assert!(err.to_string().contains("secret"));
    }

    #[test]
    fn test_retryable_categories() {
        assert!(AppError::Upstream("x".to_string()).is_retryable());
        assert!(AppError::Retrieval("x".to_string()).is_retryable());
        assert!(!AppError::Validation("x".to_string()).is_retryable());
        assert!(!AppError::Config("x".to_string()).is_retryable());
    }
}
