//! Context string assembly for the grounded prompt.

use crate::types::PassageSet;

/// Render passages as numbered question/answer blocks.
///
/// Each passage becomes `Q{i}. {text}\nA{i}. {answer}`, numbered from 1 in
/// rank order, with blocks separated by a blank line.
pub fn build_context_str(passages: &PassageSet) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, passage)| {
            format!(
                "Q{n}. {}\nA{n}. {}",
                passage.text,
                passage.answer,
                n = i + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScoredPassage;

    #[test]
    fn test_blocks_numbered_in_order() {
        let passages: PassageSet = vec![
            ScoredPassage::new("a", "what is insulin?", "A hormone.", 0.95),
            ScoredPassage::new("b", "what is a1c?", "A blood test.", 0.90),
        ]
        .into();

        assert_eq!(
            build_context_str(&passages),
            "Q1. what is insulin?\nA1. A hormone.\n\nQ2. what is a1c?\nA2. A blood test."
        );
    }

    #[test]
    fn test_single_passage_has_no_separator() {
        let passages: PassageSet = vec![ScoredPassage::new("a", "q", "a", 1.0)].into();
        assert_eq!(build_context_str(&passages), "Q1. q\nA1. a");
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(build_context_str(&PassageSet::empty()), "");
    }
}
