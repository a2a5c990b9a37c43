//! Chat command handler.
//!
//! Interactive session; history lives in memory for the session only.

use super::ask::render_answer;
use super::build_pipeline;
use clap::Args;
use docroute_core::config::AppConfig;
use docroute_knowledge::Conversation;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive question-and-answer session
#[derive(Args, Debug)]
pub struct ChatCommand {}

/// What a line of input asks the session to do.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Question(&'a str),
    Reset,
    Exit,
    Skip,
}

fn parse_input(line: &str) -> ChatInput<'_> {
    match line.trim() {
        "" => ChatInput::Skip,
        "/exit" | "/quit" => ChatInput::Exit,
        "/reset" => ChatInput::Reset,
        question => ChatInput::Question(question),
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Starting chat session");

        let pipeline = build_pipeline(config)?;
        let mut conversation = Conversation::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!(
            "Ask about company policies or candidates. \
             /reset clears the conversation, /exit quits."
        );

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_input(&line) {
                ChatInput::Skip => continue,
                ChatInput::Exit => break,
                ChatInput::Reset => {
                    conversation.clear();
                    println!("Conversation cleared.");
                }
                ChatInput::Question(question) => {
                    let result = pipeline.respond(question, conversation.turns()).await;
                    println!("{}\n", render_answer(&result));
                    conversation.record_exchange(question, result.answer);
                }
            }
        }

        tracing::info!("Chat session ended after {} turns", conversation.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("  \n"), ChatInput::Skip);
        assert_eq!(parse_input("/exit"), ChatInput::Exit);
        assert_eq!(parse_input(" /reset "), ChatInput::Reset);
        assert_eq!(
            parse_input("What is the PTO policy?\n"),
            ChatInput::Question("What is the PTO policy?")
        );
    }
}
