//! Search command handler.
//!
//! Shows what retrieval returns for a query; no answer is generated.

use super::build_pipeline;
use clap::Args;
use docroute_core::config::AppConfig;
use docroute_knowledge::rag::CLARIFICATION_MESSAGE;
use docroute_knowledge::{Category, SearchHits};

/// Show the documents retrieved for a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// The search query
    pub query: String,

    /// Domain to search (policy, resume); classified from the query when omitted
    #[arg(long)]
    pub category: Option<Category>,

    /// Number of documents to retrieve
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing search command");

        let query = self.query.trim();
        if query.is_empty() {
            anyhow::bail!("Query must not be empty");
        }
        if self.top_k == Some(0) {
            anyhow::bail!("--top-k must be at least 1");
        }

        let pipeline = build_pipeline(config)?;
        let hits = pipeline.search(query, self.category, self.top_k).await?;

        match hits {
            None if self.json => {
                let output = serde_json::json!({
                    "category": null,
                    "message": CLARIFICATION_MESSAGE,
                    "documents": [],
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            None => println!("{}", CLARIFICATION_MESSAGE),
            Some(hits) if self.json => {
                let output = serde_json::json!({
                    "category": hits.category.label(),
                    "collection": hits.collection,
                    "documents": hits.documents,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            Some(hits) => println!("{}", render_hits(&hits)),
        }

        Ok(())
    }
}

fn render_hits(hits: &SearchHits) -> String {
    let mut output = format!(
        "{} documents from {} ({})",
        hits.documents.len(),
        hits.collection,
        hits.category
    );

    for (i, doc) in hits.documents.iter().enumerate() {
        output.push_str(&format!(
            "\n\n[{}] distance {:.4}  {}",
            i + 1,
            doc.distance,
            doc.description.as_deref().unwrap_or("(no description)")
        ));
        if let Some(ref source) = doc.source {
            output.push_str(&format!("\n    source: {}", source));
        }
        if let Some(ref content) = doc.content {
            output.push_str(&format!("\n    {}", snippet(content, 200)));
        }
    }

    output
}

fn snippet(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docroute_knowledge::RetrievedDocument;

    #[test]
    fn test_snippet() {
        assert_eq!(snippet("short\n text", 20), "short text");
        assert_eq!(snippet("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn test_render_hits() {
        let hits = SearchHits {
            category: Category::ResumeDomain,
            collection: "ApplicantCV".to_string(),
            documents: vec![RetrievedDocument {
                description: Some("Jane Doe CV".to_string()),
                content: Some("Senior Rust engineer".to_string()),
                distance: 0.2,
                ..Default::default()
            }],
        };

        let rendered = render_hits(&hits);
        assert!(rendered.starts_with("1 documents from ApplicantCV (Resume)"));
        assert!(rendered.contains("[1] distance 0.2000  Jane Doe CV"));
        assert!(rendered.contains("Senior Rust engineer"));
    }
}
