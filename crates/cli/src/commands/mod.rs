//! Command handlers for the docroute CLI.

pub mod ask;
pub mod chat;
pub mod prompts;
pub mod search;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use prompts::PromptsCommand;
pub use search::SearchCommand;

use anyhow::Context;
use docroute_core::config::AppConfig;
use docroute_knowledge::RagPipeline;

/// Validate the configuration and wire the pipeline to its services.
pub(crate) fn build_pipeline(config: &AppConfig) -> anyhow::Result<RagPipeline> {
    config.validate()?;
    RagPipeline::from_config(config).context("Failed to set up the answering pipeline")
}
