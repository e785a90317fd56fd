//! Terminal rendering of answers and sources.

use futures::StreamExt;
use ragbot_core::{AppError, AppResult};
use ragbot_knowledge::{PassageSet, TokenStream};
use std::fmt::Write as _;
use std::io::Write;

/// Print tokens to stdout as they arrive and return the full answer.
///
/// On a stream failure the tokens already printed stay on screen and the
/// error is returned.
pub async fn stream_to_stdout(mut tokens: TokenStream) -> AppResult<String> {
    let mut answer = String::new();
    let mut stdout = std::io::stdout();

    while let Some(token) = tokens.next().await {
        match token {
            Ok(text) => {
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
                answer.push_str(&text);
            }
            Err(e) => {
                writeln!(stdout)?;
                return Err(e);
            }
        }
    }

    writeln!(stdout)?;
    Ok(answer)
}

/// Render sources as numbered blocks with text, answer and score.
pub fn format_sources(sources: &PassageSet) -> String {
    if sources.is_empty() {
        return "No sources: this answer was not grounded in the FAQ.".to_string();
    }

    let mut out = String::new();
    for (i, passage) in sources.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Writing to a String cannot fail
        let _ = writeln!(out, "[{}] {}", i + 1, passage.text);
        let _ = writeln!(out, "    Answer: {}", passage.answer);
        let _ = writeln!(out, "    Score: {:.2}", passage.score);
    }
    out
}

/// JSON document printed by `ask --json`.
pub fn answer_json(
    answer: &str,
    sources: &PassageSet,
    model: &str,
    provider: &str,
) -> AppResult<String> {
    let output = serde_json::json!({
        "answer": answer,
        "sources": sources,
        "model": model,
        "provider": provider,
    });

    serde_json::to_string_pretty(&output).map_err(|e| AppError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragbot_knowledge::ScoredPassage;

    #[test]
    fn test_format_sources_two_decimals() {
        let sources: PassageSet = vec![
            ScoredPassage::new("a", "what is insulin?", "A hormone.", 0.9261),
            ScoredPassage::new("b", "what is a1c?", "A blood test.", 0.85),
        ]
        .into();

        let text = format_sources(&sources);
        assert!(text.contains("[1] what is insulin?\n    Answer: A hormone.\n    Score: 0.93\n"));
        assert!(text.contains("[2] what is a1c?"));
        assert!(text.contains("Score: 0.85"));
    }

    #[test]
    fn test_format_no_sources() {
        assert!(format_sources(&PassageSet::empty()).contains("No sources"));
    }

    #[test]
    fn test_answer_json_shape() {
        let sources: PassageSet =
            vec![ScoredPassage::new("a", "q", "ans", 0.9)].into();
        let json = answer_json("Hello", &sources, "llama3.2", "ollama").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["answer"], "Hello");
        assert_eq!(value["model"], "llama3.2");
        assert_eq!(value["provider"], "ollama");
        assert_eq!(value["sources"][0]["text"], "q");
    }
}
