//! Scored suggestions shared by every stage of the pipeline.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::content::features::Destination;

pub const FACTOR_SIMILAR_USERS: &str = "similar_user_behavior";
pub const FACTOR_CONTENT: &str = "content_similarity";
pub const FACTOR_POPULARITY: &str = "popularity";
pub const FACTOR_RECENCY: &str = "recency";

/// Why a destination was suggested.
///
/// `factors` lists contributing signals in the order they were applied; the
/// optional sub-scores are the raw signal values before weighting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    pub factors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborative: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency: Option<f64>,
}

impl Reasoning {
    pub fn add_factor(&mut self, factor: &str) {
        if !self.factors.iter().any(|existing| existing == factor) {
            self.factors.push(factor.to_string());
        }
    }
}

/// A destination with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSuggestion {
    pub destination: Destination,
    pub score: f64,
    pub reasoning: Reasoning,
}

impl ScoredSuggestion {
    pub fn new(destination: Destination, score: f64) -> Self {
        Self {
            destination,
            score,
            reasoning: Reasoning::default(),
        }
    }

    pub fn path(&self) -> &str {
        &self.destination.path
    }
}

/// Descending by score, ties by path.
pub fn compare_desc(a: &ScoredSuggestion, b: &ScoredSuggestion) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.path().cmp(b.path()))
}

pub fn sort_desc(suggestions: &mut [ScoredSuggestion]) {
    suggestions.sort_by(compare_desc);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_desc_breaks_ties_by_path() {
        let mut suggestions = vec![
            ScoredSuggestion::new(Destination::from_path("/b"), 0.5),
            ScoredSuggestion::new(Destination::from_path("/c"), 0.9),
            ScoredSuggestion::new(Destination::from_path("/a"), 0.5),
        ];
        sort_desc(&mut suggestions);

        let paths: Vec<&str> = suggestions.iter().map(ScoredSuggestion::path).collect();
        assert_eq!(paths, vec!["/c", "/a", "/b"]);
    }

    #[test]
    fn test_add_factor_is_deduplicated() {
        let mut reasoning = Reasoning::default();
        reasoning.add_factor(FACTOR_CONTENT);
        reasoning.add_factor(FACTOR_POPULARITY);
        reasoning.add_factor(FACTOR_CONTENT);
        assert_eq!(reasoning.factors, vec![FACTOR_CONTENT, FACTOR_POPULARITY]);
    }
}
