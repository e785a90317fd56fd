//! Validation of user questions before they reach the workflow.

use ragbot_core::{AppError, AppResult};

/// Longest question accepted, in characters.
pub const MAX_QUESTION_CHARS: usize = 1000;

/// Trim a question and check it is non-empty and within the length limit.
pub fn validate_question(input: &str) -> AppResult<&str> {
    let question = input.trim();

    if question.is_empty() {
        return Err(AppError::Validation(
            "Question cannot be empty".to_string(),
        ));
    }

    let chars = question.chars().count();
    if chars > MAX_QUESTION_CHARS {
        return Err(AppError::Validation(format!(
            "Question is {} characters long; the limit is {}",
            chars, MAX_QUESTION_CHARS
        )));
    }

    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_valid_question() {
        assert_eq!(
            validate_question("  What is insulin?\n").unwrap(),
            "What is insulin?"
        );
    }

    #[test]
    fn test_rejects_blank() {
        assert!(matches!(
            validate_question(" \t "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_QUESTION_CHARS);
        assert!(validate_question(&at_limit).is_ok());

        let over = "a".repeat(MAX_QUESTION_CHARS + 1);
        let err = validate_question(&over).unwrap_err();
        assert!(err.to_string().contains("limit is 1000"));
    }
}
