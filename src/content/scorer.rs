//! Content-based scorer: profile-to-destination feature similarity.

use std::collections::BTreeSet;

use ahash::AHashSet;

use crate::config::ContentConfig;
use crate::content::features::ContentFeatures;
use crate::content::index::FeatureIndex;
use crate::content::profile::ContentProfile;
use crate::suggestion::{FACTOR_CONTENT, ScoredSuggestion, sort_desc};

/// Scores unvisited destinations against a user's content profile.
#[derive(Debug, Clone)]
pub struct ContentScorer {
    config: ContentConfig,
}

impl ContentScorer {
    pub fn new(config: ContentConfig) -> Self {
        Self { config }
    }

    /// Weighted similarity of `features` to `profile`, clamped to [0, 1].
    pub fn similarity(&self, profile: &ContentProfile, features: &ContentFeatures) -> f64 {
        let category = match &profile.primary_category {
            Some(category) if *category == features.category => 1.0,
            _ => 0.0,
        };
        let data_types = jaccard(&profile.data_types, &features.data_types);
        let business_function = match &profile.business_function {
            Some(function) if *function == features.business_function => 1.0,
            _ => 0.0,
        };
        let complexity = profile
            .complexity
            .map(|level| level.closeness(features.complexity))
            .unwrap_or(0.0);

        let score = category * self.config.category_weight
            + data_types * self.config.data_types_weight
            + business_function * self.config.business_function_weight
            + complexity * self.config.complexity_weight;

        score.clamp(0.0, 1.0)
    }

    /// Destinations outside `history` scoring at least the configured
    /// minimum, best first.
    pub fn score(
        &self,
        profile: &ContentProfile,
        index: &FeatureIndex,
        history: &AHashSet<String>,
    ) -> Vec<ScoredSuggestion> {
        if profile.is_empty() {
            return Vec::new();
        }

        let mut suggestions: Vec<ScoredSuggestion> = index
            .destinations()
            .filter(|entry| !history.contains(&entry.path))
            .filter_map(|entry| {
                let similarity = self.similarity(profile, &entry.features);
                if similarity < self.config.min_score {
                    return None;
                }

                let mut suggestion = ScoredSuggestion::new(entry.destination(), similarity);
                suggestion.reasoning.content = Some(similarity);
                suggestion.reasoning.add_factor(FACTOR_CONTENT);
                Some(suggestion)
            })
            .collect();

        sort_desc(&mut suggestions);
        suggestions
    }
}

/// |A ∩ B| / |A ∪ B|, 0 when both sets are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::features::{CatalogEntry, Complexity};

    fn features(category: &str, complexity: Complexity, data: &[&str], function: &str) -> ContentFeatures {
        ContentFeatures::new(category, complexity, data.iter().copied(), function)
    }

    fn profile_of(features: &ContentFeatures) -> ContentProfile {
        ContentProfile {
            primary_category: Some(features.category.clone()),
            data_types: features.data_types.clone(),
            business_function: Some(features.business_function.clone()),
            complexity: Some(features.complexity),
            known_visits: 1,
        }
    }

    #[test]
    fn test_jaccard() {
        let a: BTreeSet<String> = ["revenue", "trends"].iter().map(|s| s.to_string()).collect();
        let b: BTreeSet<String> = ["trends", "forecasts"].iter().map(|s| s.to_string()).collect();
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(jaccard(&BTreeSet::new(), &BTreeSet::new()), 0.0);
    }

    #[test]
    fn test_identical_features_score_one() {
        let scorer = ContentScorer::new(ContentConfig::default());
        let revenue = features("financial", Complexity::Medium, &["revenue", "trends"], "finance");
        assert!((scorer.similarity(&profile_of(&revenue), &revenue) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_complexity_difference_ranks_between_category_only_and_identical() {
        let scorer = ContentScorer::new(ContentConfig::default());
        let base = features("financial", Complexity::Low, &["revenue", "trends"], "finance");
        let profile = profile_of(&base);

        let harder = features("financial", Complexity::High, &["revenue", "trends"], "finance");
        let category_only = features("financial", Complexity::Low, &["headcount"], "hr");

        let harder_score = scorer.similarity(&profile, &harder);
        let category_only_score = scorer.similarity(&profile, &category_only);

        assert!(harder_score < 1.0);
        assert!(harder_score > category_only_score);
    }

    #[test]
    fn test_score_excludes_history_and_low_scores() {
        let index = FeatureIndex::from_entries(vec![
            CatalogEntry::new(
                "/revenue",
                "Revenue",
                features("financial", Complexity::Medium, &["revenue", "trends"], "finance"),
            ),
            CatalogEntry::new(
                "/expenses",
                "Expenses",
                features("financial", Complexity::Medium, &["expenses", "trends"], "finance"),
            ),
            CatalogEntry::new(
                "/analytics",
                "Analytics",
                features("analytics", Complexity::High, &["data", "insights"], "analysis"),
            ),
        ])
        .unwrap();
        let scorer = ContentScorer::new(ContentConfig::default());
        let profile = ContentProfile::from_visits(&index, ["/revenue"]);
        let history: AHashSet<String> = ["/revenue".to_string()].into_iter().collect();

        let suggestions = scorer.score(&profile, &index, &history);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].path(), "/expenses");
        // 0.3 + 0.25 * (1/3) + 0.25 + 0.2
        assert!((suggestions[0].score - (0.75 + 0.25 / 3.0)).abs() < 1e-9);
        assert_eq!(suggestions[0].reasoning.factors, vec![FACTOR_CONTENT]);
    }

    #[test]
    fn test_empty_profile_scores_nothing() {
        let index = FeatureIndex::builtin();
        let scorer = ContentScorer::new(ContentConfig::default());
        let suggestions = scorer.score(&ContentProfile::default(), &index, &AHashSet::new());
        assert!(suggestions.is_empty());
    }
}
