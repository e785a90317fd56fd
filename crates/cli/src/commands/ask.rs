//! Ask command handler.
//!
//! Answers a single question and exits.

use crate::bootstrap::build_workflow;
use crate::output::{answer_json, format_sources, stream_to_stdout};
use crate::question::validate_question;
use clap::Args;
use ragbot_core::{AppConfig, AppResult};

/// Answer one question from the FAQ
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the FAQ entries used after the answer
    #[arg(long)]
    pub show_sources: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let joined = self.question.join(" ");
        let question = validate_question(&joined)?;

        let workflow = build_workflow(config).await?;
        let result = workflow.answer(question).await?;

        if self.json {
            let (answer, sources) = result.collect().await?;
            println!(
                "{}",
                answer_json(&answer, &sources, &config.model, &config.provider)?
            );
            return Ok(());
        }

        stream_to_stdout(result.tokens).await?;

        if self.show_sources {
            println!("\nSources:\n{}", format_sources(&result.sources));
        }

        Ok(())
    }
}
