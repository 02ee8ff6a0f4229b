//! Synthetic content profile of a user's recent interests.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use ahash::{AHashMap, AHashSet};
use unicode_segmentation::UnicodeSegmentation;

use crate::content::features::Complexity;
use crate::content::index::FeatureIndex;

/// Aggregate features of the destinations a user recently visited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentProfile {
    /// Most frequent category among visits.
    pub primary_category: Option<String>,
    /// Union of the visited destinations' data types.
    pub data_types: BTreeSet<String>,
    /// Most frequent business function among visits.
    pub business_function: Option<String>,
    /// Most frequent complexity among visits.
    pub complexity: Option<Complexity>,
    /// Number of visits to destinations known to the index.
    pub known_visits: usize,
}

impl ContentProfile {
    /// Build a profile from a sequence of visited paths, each counting 1.0.
    pub fn from_visits<'a, I>(index: &FeatureIndex, visits: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::from_weighted_visits(index, visits.into_iter().map(|path| (path, 1.0)))
    }

    /// Build a profile from visited paths tallied by weight. Category,
    /// business function and complexity go to the heaviest total; paths
    /// missing from the index are skipped.
    pub fn from_weighted_visits<'a, I>(index: &FeatureIndex, visits: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut categories: AHashMap<&str, f64> = AHashMap::new();
        let mut functions: AHashMap<&str, f64> = AHashMap::new();
        let mut complexities: AHashMap<Complexity, f64> = AHashMap::new();
        let mut profile = ContentProfile::default();

        for (path, weight) in visits {
            let Some(features) = index.get_features(path) else {
                log::debug!("no content features for visited destination {path}");
                continue;
            };
            let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };

            profile.known_visits += 1;
            *categories.entry(features.category.as_str()).or_insert(0.0) += weight;
            *functions
                .entry(features.business_function.as_str())
                .or_insert(0.0) += weight;
            *complexities.entry(features.complexity).or_insert(0.0) += weight;
            profile
                .data_types
                .extend(features.data_types.iter().cloned());
        }

        profile.primary_category = mode(categories).map(str::to_string);
        profile.business_function = mode(functions).map(str::to_string);
        profile.complexity = mode(complexities);
        profile
    }

    /// Cold-start profile: destinations whose keywords appear in the query
    /// are treated as one visit each.
    pub fn from_query(index: &FeatureIndex, query: &str) -> Self {
        let words: AHashSet<String> = query.unicode_words().map(str::to_lowercase).collect();
        let matched = index.destinations().filter(|entry| {
            entry
                .features
                .keywords()
                .iter()
                .any(|keyword| words.contains(keyword))
        });
        Self::from_visits(index, matched.map(|entry| entry.path.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.primary_category.is_none()
            && self.business_function.is_none()
            && self.complexity.is_none()
            && self.data_types.is_empty()
    }
}

/// Heaviest total wins; ties go to the smallest key.
fn mode<K: Ord + Copy>(totals: AHashMap<K, f64>) -> Option<K> {
    totals
        .into_iter()
        .max_by(|(key_a, total_a), (key_b, total_b)| {
            total_a
                .partial_cmp(total_b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| key_b.cmp(key_a))
        })
        .map(|(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_visits() {
        let index = FeatureIndex::builtin();
        let profile = ContentProfile::from_visits(
            &index,
            ["/revenue", "/revenue", "/expenses", "/customers"],
        );

        assert_eq!(profile.primary_category.as_deref(), Some("financial"));
        assert_eq!(profile.business_function.as_deref(), Some("finance"));
        assert_eq!(profile.complexity, Some(Complexity::Medium));
        assert_eq!(profile.known_visits, 4);
        assert!(profile.data_types.contains("revenue"));
        assert!(profile.data_types.contains("expenses"));
        assert!(profile.data_types.contains("segments"));
    }

    #[test]
    fn test_unknown_visits_are_skipped() {
        let index = FeatureIndex::builtin();
        let profile = ContentProfile::from_visits(&index, ["/beta", "/gamma"]);
        assert!(profile.is_empty());
        assert_eq!(profile.known_visits, 0);
    }

    #[test]
    fn test_mode_ties_break_toward_smallest() {
        let index = FeatureIndex::builtin();
        // One "financial" visit and one "analytics" visit.
        let profile = ContentProfile::from_visits(&index, ["/revenue", "/analytics"]);
        assert_eq!(profile.primary_category.as_deref(), Some("analytics"));
        assert_eq!(profile.complexity, Some(Complexity::Medium));
    }

    #[test]
    fn test_weighted_visits_outweigh_frequency() {
        let index = FeatureIndex::builtin();
        // One export of revenue against one click on customers.
        let profile = ContentProfile::from_weighted_visits(
            &index,
            [("/revenue", 3.0), ("/customers", 1.0)],
        );
        assert_eq!(profile.primary_category.as_deref(), Some("financial"));
        assert_eq!(profile.business_function.as_deref(), Some("finance"));
        assert_eq!(profile.known_visits, 2);

        // Two clicks on customers still lose to one export.
        let profile = ContentProfile::from_weighted_visits(
            &index,
            [("/customers", 1.0), ("/revenue", 3.0), ("/customers", 1.0)],
        );
        assert_eq!(profile.primary_category.as_deref(), Some("financial"));
    }

    #[test]
    fn test_profile_from_query() {
        let index = FeatureIndex::builtin();
        // Matches /customers ("customer", "segments") and /audience-insights ("segments").
        let profile = ContentProfile::from_query(&index, "Show customer segments, please");

        assert_eq!(profile.known_visits, 2);
        assert_eq!(profile.primary_category.as_deref(), Some("customers"));
        assert_eq!(profile.business_function.as_deref(), Some("marketing"));
        assert_eq!(profile.complexity, Some(Complexity::Medium));
        assert!(profile.data_types.contains("customer_data"));
        assert!(profile.data_types.contains("demographics"));

        assert!(ContentProfile::from_query(&index, "nothing relevant").is_empty());
    }
}
