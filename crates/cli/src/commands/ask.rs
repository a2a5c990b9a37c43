//! Ask command handler.
//!
//! Runs the pipeline once and prints the answer with its citations.

use super::build_pipeline;
use anyhow::Context;
use clap::Args;
use docroute_core::config::AppConfig;
use docroute_knowledge::{AnswerResult, Conversation};
use std::path::{Path, PathBuf};

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// JSON file with prior conversation turns: [{"role": "user", "text": "..."}]
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Output as JSON ({answer, citations})
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing ask command");

        let question = self.question.trim();
        if question.is_empty() {
            anyhow::bail!("Question must not be empty");
        }

        let conversation = match self.history {
            Some(ref path) => load_history(path)?,
            None => Conversation::new(),
        };
        tracing::debug!("Loaded {} history turns", conversation.len());

        let pipeline = build_pipeline(config)?;
        let result = pipeline.respond(question, conversation.turns()).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", render_answer(&result));
        }

        Ok(())
    }
}

fn load_history(path: &Path) -> anyhow::Result<Conversation> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {:?}", path))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("History file {:?} is not a JSON array of turns", path))
}

/// Plain-text rendering: the answer, then numbered sources if there are any.
pub(crate) fn render_answer(result: &AnswerResult) -> String {
    let mut output = result.answer.clone();

    if !result.citations.is_empty() {
        output.push_str("\n\nSources:");
        for citation in &result.citations {
            output.push_str(&format!("\n  [{}] {}", citation.index, citation.title));
            if let Some(ref source) = citation.source {
                output.push_str(&format!(" ({})", source));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use docroute_knowledge::Citation;

    #[test]
    fn test_render_answer_with_sources() {
        let result = AnswerResult::new(
            "Dental is covered at 80%.",
            vec![
                Citation {
                    index: 1,
                    title: "Dental plan".to_string(),
                    source: Some("benefits.pdf".to_string()),
                },
                Citation {
                    index: 2,
                    title: "Document 2".to_string(),
                    source: None,
                },
            ],
        );

        assert_eq!(
            render_answer(&result),
            "Dental is covered at 80%.\n\nSources:\n  [1] Dental plan (benefits.pdf)\n  [2] Document 2"
        );
    }

    #[test]
    fn test_render_answer_without_sources() {
        assert_eq!(render_answer(&AnswerResult::no_results()), AnswerResult::no_results().answer);
    }

    #[test]
    fn test_load_history_errors_are_reported() {
        let missing = std::env::temp_dir().join("docroute-no-such-history.json");
        assert!(load_history(&missing).is_err());
    }
}
