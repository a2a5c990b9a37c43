//! Prompt system for docroute.
//!
//! Structured prompt management with:
//! - YAML prompt definitions (system + user templates)
//! - Handlebars rendering
//! - Built-in defaults overridable per workspace

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{builtin_prompt, list_prompts, load_prompt, ANSWER_PROMPT_ID, CLASSIFY_PROMPT_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
