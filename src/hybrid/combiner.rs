//! Merging of scorer outputs and global signals into one ranked list.

use std::cmp::Ordering;

use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Utc};

use super::types::Algorithm;

use crate::config::HybridConfig;
use crate::content::index::FeatureIndex;
use crate::interaction::GlobalSignals;
use crate::profile::UserPreferences;
use crate::suggestion::{FACTOR_POPULARITY, FACTOR_RECENCY, ScoredSuggestion, compare_desc};

/// Confidence multiplier when only one scorer contributed.
const SINGLE_SOURCE_CONFIDENCE: f64 = 0.8;

/// Output of the combiner before metadata is attached.
#[derive(Debug, Clone)]
pub struct CombinedSuggestions {
    pub suggestions: Vec<ScoredSuggestion>,
    pub algorithm: Algorithm,
    pub confidence: f64,
    pub explanations: Vec<String>,
    pub candidate_count: usize,
}

/// Weighted merger of collaborative, content, popularity and recency signals.
#[derive(Debug, Clone)]
pub struct HybridCombiner {
    config: HybridConfig,
}

impl HybridCombiner {
    pub fn new(config: HybridConfig) -> Self {
        Self { config }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn combine(
        &self,
        collaborative: Vec<ScoredSuggestion>,
        content: Vec<ScoredSuggestion>,
        history: &AHashSet<String>,
        signals: &GlobalSignals,
        index: &FeatureIndex,
        preferences: Option<&UserPreferences>,
        now: DateTime<Utc>,
    ) -> CombinedSuggestions {
        let algorithm = Algorithm::from_sources(!collaborative.is_empty(), !content.is_empty());
        if algorithm == Algorithm::Fallback {
            return CombinedSuggestions {
                suggestions: Vec::new(),
                algorithm,
                confidence: 0.0,
                explanations: vec![
                    "Not enough navigation data yet to suggest pages".to_string(),
                ],
                candidate_count: 0,
            };
        }

        let mut merged: AHashMap<String, ScoredSuggestion> = AHashMap::new();

        for mut suggestion in collaborative {
            suggestion.score *= self.config.collaborative_weight;
            merged.insert(suggestion.destination.path.clone(), suggestion);
        }

        for suggestion in content {
            let scaled = suggestion.score * self.config.content_weight;
            match merged.get_mut(suggestion.path()) {
                Some(existing) => {
                    existing.score += scaled;
                    existing.reasoning.content = suggestion.reasoning.content;
                    for factor in &suggestion.reasoning.factors {
                        existing.reasoning.add_factor(factor);
                    }
                }
                None => {
                    let mut suggestion = suggestion;
                    suggestion.score = scaled;
                    merged.insert(suggestion.destination.path.clone(), suggestion);
                }
            }
        }

        let candidate_count = merged.len();

        for suggestion in merged.values_mut() {
            let path = suggestion.destination.path.clone();
            let popularity = signals.popularity(&path);
            let recency = signals.recency(&path, now);

            suggestion.score += popularity * self.config.popularity_weight
                + recency * self.config.recency_weight;
            suggestion.score = suggestion.score.max(0.0);
            suggestion.reasoning.popularity = Some(popularity);
            suggestion.reasoning.recency = Some(recency);
            if popularity > 0.0 {
                suggestion.reasoning.add_factor(FACTOR_POPULARITY);
            }
            if recency > 0.0 {
                suggestion.reasoning.add_factor(FACTOR_RECENCY);
            }
            suggestion.destination = index.describe(&path);
        }

        let mut suggestions: Vec<ScoredSuggestion> = merged
            .into_values()
            .filter(|suggestion| suggestion.score > self.config.min_score)
            .filter(|suggestion| !history.contains(suggestion.path()))
            .collect();

        suggestions.sort_by(|a, b| Self::rank(a, b, preferences));
        suggestions.truncate(self.config.max_suggestions);

        let confidence = self.confidence(&suggestions, algorithm);
        let explanations = Self::explain(&suggestions, algorithm);

        CombinedSuggestions {
            suggestions,
            algorithm,
            confidence,
            explanations,
            candidate_count,
        }
    }

    /// Descending score; equal scores favour preferred categories, then path.
    fn rank(
        a: &ScoredSuggestion,
        b: &ScoredSuggestion,
        preferences: Option<&UserPreferences>,
    ) -> Ordering {
        let by_score = b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal);
        if by_score != Ordering::Equal {
            return by_score;
        }

        if let Some(preferences) = preferences {
            let a_preferred = preferences.prefers(a.destination.category.as_deref());
            let b_preferred = preferences.prefers(b.destination.category.as_deref());
            if a_preferred != b_preferred {
                return b_preferred.cmp(&a_preferred);
            }
        }

        compare_desc(a, b)
    }

    fn confidence(&self, suggestions: &[ScoredSuggestion], algorithm: Algorithm) -> f64 {
        let max_score = self.config.max_score();
        if suggestions.is_empty() || max_score <= 0.0 {
            return 0.0;
        }

        let mean = suggestions.iter().map(|s| s.score).sum::<f64>() / suggestions.len() as f64;
        let multiplier = match algorithm {
            Algorithm::Hybrid => 1.0,
            _ => SINGLE_SOURCE_CONFIDENCE,
        };
        (mean / max_score * multiplier).clamp(0.0, 1.0)
    }

    fn explain(suggestions: &[ScoredSuggestion], algorithm: Algorithm) -> Vec<String> {
        if suggestions.is_empty() {
            return vec!["No page cleared the relevance threshold".to_string()];
        }

        let mut explanations = Vec::new();
        match algorithm {
            Algorithm::Hybrid => {
                explanations.push(
                    "Combines pages favoured by users with similar navigation and pages matching your recent interests"
                        .to_string(),
                );
            }
            Algorithm::Collaborative => {
                explanations.push("Users with similar navigation patterns also visited these pages".to_string());
            }
            Algorithm::ContentBased => {
                explanations.push("These pages cover data similar to what you have been viewing".to_string());
            }
            Algorithm::Fallback => {}
        }

        if suggestions
            .iter()
            .any(|s| s.reasoning.factors.iter().any(|f| f == FACTOR_POPULARITY))
        {
            explanations.push("Ranking includes page popularity across all users".to_string());
        }

        explanations
    }
}
