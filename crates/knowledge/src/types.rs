//! Knowledge type definitions.

use serde::{Deserialize, Serialize};

/// One FAQ item as stored on disk: several phrasings of a question sharing
/// a single answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    #[serde(default)]
    pub questions: Vec<String>,

    #[serde(default)]
    pub answer: String,
}

/// An indexable document: one question phrasing plus its answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqDocument {
    /// Stable identifier, `<file stem>:<entry>:<question>`
    pub id: String,

    /// Question text as written in the corpus
    pub text: String,

    /// Answer shared by all phrasings of the entry
    pub answer: String,
}

/// A retrieved passage with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    /// Document identifier
    pub id: String,

    /// Passage text (the FAQ question)
    pub text: String,

    /// Stored answer for the passage
    pub answer: String,

    /// Relevance score in [0, 1]
    pub score: f32,
}

impl ScoredPassage {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        answer: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            answer: answer.into(),
            score,
        }
    }
}

/// Passages in retrieval-rank order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassageSet(Vec<ScoredPassage>);

impl PassageSet {
    pub fn new(passages: Vec<ScoredPassage>) -> Self {
        Self(passages)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredPassage> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ScoredPassage] {
        &self.0
    }

    /// Highest score in the set, if any.
    pub fn max_score(&self) -> Option<f32> {
        self.0.iter().map(|p| p.score).reduce(f32::max)
    }
}

impl From<Vec<ScoredPassage>> for PassageSet {
    fn from(passages: Vec<ScoredPassage>) -> Self {
        Self(passages)
    }
}

impl FromIterator<ScoredPassage> for PassageSet {
    fn from_iter<I: IntoIterator<Item = ScoredPassage>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PassageSet {
    type Item = ScoredPassage;
    type IntoIter = std::vec::IntoIter<ScoredPassage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PassageSet {
    type Item = &'a ScoredPassage;
    type IntoIter = std::slice::Iter<'a, ScoredPassage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
