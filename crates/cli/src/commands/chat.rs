//! Interactive chat command.
//!
//! Reads questions from stdin, streams each answer, and keeps a history of
//! turns whose sources can be inspected with `/sources`.

use crate::bootstrap::build_workflow;
use crate::history::ConversationHistory;
use crate::output::{format_sources, stream_to_stdout};
use crate::question::validate_question;
use clap::Args;
use ragbot_core::{AppConfig, AppError, AppResult};
use ragbot_knowledge::QaWorkflow;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Ask a diabetes question, or use a command:
  /sources [n]  show the FAQ entries behind the last (or n-th) answer
  /history      list the questions and answers so far
  /help         show this message
  /quit         leave the chat";

/// Start an interactive chat session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Do not print the welcome banner
    #[arg(long)]
    pub quiet: bool,
}

/// One line of chat input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Question(String),
    Sources(Option<usize>),
    History,
    Help,
    Quit,
    Unknown(String),
}

impl ChatInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return ChatInput::Question(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("sources"), None) => ChatInput::Sources(None),
            (Some("sources"), Some(n)) => match n.parse() {
                Ok(n) => ChatInput::Sources(Some(n)),
                Err(_) => ChatInput::Unknown(line.to_string()),
            },
            (Some("history"), None) => ChatInput::History,
            (Some("help"), None) => ChatInput::Help,
            (Some("quit"), None) | (Some("exit"), None) => ChatInput::Quit,
            _ => ChatInput::Unknown(line.to_string()),
        }
    }
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let workflow = build_workflow(config).await?;
        let mut history = ConversationHistory::new();

        if !self.quiet {
            println!("RAGBot ({} / {})", config.provider, config.model);
            println!("{}\n", HELP);
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            match ChatInput::parse(&line) {
                ChatInput::Quit => break,
                ChatInput::Help => println!("{}", HELP),
                ChatInput::History => println!("{}", format_history(&history)),
                ChatInput::Sources(n) => print_turn_sources(&history, n),
                ChatInput::Unknown(input) => {
                    println!("Unknown command: {} (try /help)", input)
                }
                ChatInput::Question(input) => match accept_question(&input) {
                    Ok(question) => {
                        if let Err(e) = ask(&workflow, &mut history, question).await {
                            tracing::error!("Question failed: {}", e);
                            eprintln!("Error: {}", e);
                        }
                    }
                    Err(message) => {
                        tracing::warn!("Rejected chat input: {}", message);
                        println!("{}", message);
                    }
                },
            }
        }

        tracing::info!("Chat session ended after {} turns", history.len());
        Ok(())
    }
}

/// Validate a chat line, turning a rejection into a message for the user.
fn accept_question(input: &str) -> Result<&str, String> {
    validate_question(input).map_err(|e| match e {
        AppError::Validation(reason) => format!("Please enter a valid question. {}.", reason),
        other => other.to_string(),
    })
}

async fn ask(
    workflow: &QaWorkflow,
    history: &mut ConversationHistory,
    question: &str,
) -> AppResult<()> {
    let result = workflow.answer(question).await?;
    let answer = stream_to_stdout(result.tokens).await?;

    history.push(question, answer, result.sources);
    Ok(())
}

fn format_history(history: &ConversationHistory) -> String {
    if history.is_empty() {
        return "No questions yet.".to_string();
    }

    history
        .turns()
        .iter()
        .enumerate()
        .map(|(i, turn)| {
            format!(
                "{:>3}. {}\n     {} ({} sources)",
                i + 1,
                turn.user.content,
                turn.assistant.content,
                turn.sources.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_turn_sources(history: &ConversationHistory, n: Option<usize>) {
    let turn = match n {
        Some(n) => history.get(n),
        None => history.last(),
    };

    match turn {
        Some(turn) => println!("{}", format_sources(&turn.sources)),
        None => println!("No such answer."),
    }
}
