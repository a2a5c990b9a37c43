//! Prompts command handler.

use clap::{Args, Subcommand};
use docroute_core::config::AppConfig;
use docroute_prompt::{list_prompts, load_prompt};

/// Inspect prompt definitions
#[derive(Args, Debug)]
pub struct PromptsCommand {
    #[command(subcommand)]
    pub action: PromptsAction,
}

#[derive(Subcommand, Debug)]
pub enum PromptsAction {
    /// List available prompt ids (built-in and workspace overrides)
    List,
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        match self.action {
            PromptsAction::List => {
                for id in list_prompts(&config.workspace)? {
                    let title = load_prompt(&config.workspace, &id)
                        .map(|p| p.title)
                        .unwrap_or_else(|e| format!("(invalid: {})", e));
                    println!("{:<16} {}", id, title);
                }
                Ok(())
            }
        }
    }
}
