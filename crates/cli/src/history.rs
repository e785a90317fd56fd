//! Conversation history kept by the chat front end.
//!
//! Each answered question is stored as one explicit turn record, so the
//! sources shown for an answer always belong to that answer.

use ragbot_knowledge::PassageSet;
use ragbot_llm::ChatMessage;

/// One question and the answer given to it.
#[derive(Debug, Clone)]
pub struct Turn {
    pub user: ChatMessage,
    pub assistant: ChatMessage,

    /// Passages that grounded the answer; empty for no-context answers
    pub sources: PassageSet,
}

/// Ordered record of a chat session.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed turn.
    pub fn push(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
        sources: PassageSet,
    ) {
        self.turns.push(Turn {
            user: ChatMessage::user(question),
            assistant: ChatMessage::assistant(answer),
            sources,
        });
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Turn by 1-based position.
    pub fn get(&self, n: usize) -> Option<&Turn> {
        n.checked_sub(1).and_then(|i| self.turns.get(i))
    }
}
