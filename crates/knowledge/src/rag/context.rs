//! Renders retrieved documents into the generator's context block.

use super::types::Citation;
use crate::types::RetrievedDocument;
use std::fmt::Display;

/// Separator placed between rendered documents.
pub const DOCUMENT_DELIMITER: &str = "\n\n---\n\n";

const MISSING: &str = "N/A";

/// Context text plus one citation per rendered document.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Render documents in the given order. Pure; never reorders or drops input.
pub fn assemble(docs: &[RetrievedDocument]) -> AssembledContext {
    let text = docs
        .iter()
        .enumerate()
        .map(|(i, doc)| render_document(i + 1, doc))
        .collect::<Vec<_>>()
        .join(DOCUMENT_DELIMITER);

    let citations = docs
        .iter()
        .enumerate()
        .map(|(i, doc)| citation_for(i + 1, doc))
        .collect();

    AssembledContext { text, citations }
}

fn render_document(index: usize, doc: &RetrievedDocument) -> String {
    format!(
        "Document #{index}:\n\
         - Description: {}\n\
         - Content: {}\n\
         - Source: {}\n\
         - Requester: {} <{}>\n\
         - PDF File ID: {}\n\
         - Instance ID: {}\n\
         - Chunk Index: {}\n\
         - Chunk Count: {}\n\
         - Chunk ID: {}\n\
         - Relevance Score (distance): {}",
        field(&doc.description),
        field(&doc.content),
        field(&doc.source),
        field(&doc.requester_name),
        field(&doc.requester_email),
        field(&doc.pdf_file_id),
        field(&doc.instance_id),
        field(&doc.chunk_index),
        field(&doc.chunk_count),
        field(&doc.chunk_id),
        doc.distance,
    )
}

fn field<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| MISSING.to_string())
}

fn citation_for(index: usize, doc: &RetrievedDocument) -> Citation {
    let title = doc
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Document {}", index));

    Citation {
        index,
        title,
        source: doc.source.clone().filter(|s| !s.trim().is_empty()),
    }
}
