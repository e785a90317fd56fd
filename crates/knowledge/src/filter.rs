//! Relevance filtering of retrieved passages.

use crate::types::PassageSet;

/// Default minimum relevance score for a passage to ground an answer.
pub const DEFAULT_SIMILARITY_CUTOFF: f32 = 0.85;

/// Drops passages whose score falls below a fixed cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceFilter {
    cutoff: f32,
}

impl RelevanceFilter {
    pub fn new(cutoff: f32) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Keep every passage with `score >= cutoff`, in input order.
    pub fn filter(&self, passages: PassageSet) -> PassageSet {
        let before = passages.len();
        let kept: PassageSet = passages
            .into_iter()
            .filter(|p| p.score >= self.cutoff)
            .collect();

        tracing::debug!(
            "Relevance filter kept {}/{} passages (cutoff {:.2})",
            kept.len(),
            before,
            self.cutoff
        );

        kept
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_CUTOFF)
    }
}
