//! Collaborative scorer: propagate the preferences of similar users.
//!
//! Similarity between two users is the cosine of their interaction matrices
//! restricted to the targets both have visited. Users with no target in
//! common are never neighbours, whatever the threshold.

use std::cmp::Ordering;

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;

use crate::config::CollaborativeConfig;
use crate::content::features::Destination;
use crate::interaction::InteractionMatrix;
use crate::suggestion::{FACTOR_SIMILAR_USERS, ScoredSuggestion, sort_desc};

/// A user similar to the requester.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub user_id: String,
    pub similarity: f64,
}

/// Output of one collaborative pass.
#[derive(Debug, Clone, Default)]
pub struct CollaborativeOutcome {
    /// Scores normalised into [0, 1], best first.
    pub suggestions: Vec<ScoredSuggestion>,
    pub neighbor_count: usize,
}

#[derive(Debug, Clone)]
pub struct CollaborativeScorer {
    config: CollaborativeConfig,
}

impl CollaborativeScorer {
    pub fn new(config: CollaborativeConfig) -> Self {
        Self { config }
    }

    /// Neighbours of `user_id` above the similarity threshold, most similar
    /// first, at most `max_neighbors`.
    pub fn find_neighbors(
        &self,
        user_id: &str,
        matrix: &InteractionMatrix,
        users: &[(String, InteractionMatrix)],
    ) -> Vec<Neighbor> {
        let mut neighbors: Vec<Neighbor> = users
            .par_iter()
            .filter(|(other_id, _)| other_id != user_id)
            .filter_map(|(other_id, other)| {
                let similarity = intersection_cosine(matrix, other);
                (similarity > self.config.similarity_threshold).then(|| Neighbor {
                    user_id: other_id.clone(),
                    similarity,
                })
            })
            .collect();

        neighbors.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        neighbors.truncate(self.config.max_neighbors);
        neighbors
    }

    /// Score destinations for `user_id` from the matrices of all known users.
    ///
    /// Returns nothing when fewer than `min_neighbors` similar users exist.
    pub fn score(
        &self,
        user_id: &str,
        users: &[(String, InteractionMatrix)],
        history: &AHashSet<String>,
    ) -> CollaborativeOutcome {
        let Some((_, matrix)) = users.iter().find(|(id, _)| id == user_id) else {
            return CollaborativeOutcome::default();
        };
        if matrix.is_empty() {
            return CollaborativeOutcome::default();
        }

        let neighbors = self.find_neighbors(user_id, matrix, users);
        if neighbors.len() < self.config.min_neighbors {
            log::debug!(
                "user {user_id} has {} neighbours, {} required; skipping collaborative scoring",
                neighbors.len(),
                self.config.min_neighbors
            );
            return CollaborativeOutcome {
                suggestions: Vec::new(),
                neighbor_count: neighbors.len(),
            };
        }

        let by_id: AHashMap<&str, &InteractionMatrix> = users
            .iter()
            .map(|(id, matrix)| (id.as_str(), matrix))
            .collect();

        let mut accumulated: AHashMap<&str, f64> = AHashMap::new();
        for neighbor in &neighbors {
            let Some(neighbor_matrix) = by_id.get(neighbor.user_id.as_str()) else {
                continue;
            };
            for (target, weight) in neighbor_matrix.iter() {
                if history.contains(target) {
                    continue;
                }
                *accumulated.entry(target).or_insert(0.0) +=
                    weight * neighbor.similarity * self.config.decay_factor;
            }
        }

        let max_score = accumulated.values().copied().fold(0.0_f64, f64::max);
        let mut suggestions: Vec<ScoredSuggestion> = accumulated
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .map(|(target, score)| {
                let normalized = score / max_score;
                let mut suggestion = ScoredSuggestion::new(Destination::from_path(target), normalized);
                suggestion.reasoning.collaborative = Some(normalized);
                suggestion.reasoning.add_factor(FACTOR_SIMILAR_USERS);
                suggestion
            })
            .collect();

        sort_desc(&mut suggestions);
        CollaborativeOutcome {
            suggestions,
            neighbor_count: neighbors.len(),
        }
    }
}

/// Cosine similarity over the targets present in both matrices.
///
/// 0 when the matrices share no target or the shared weights are all zero.
pub fn intersection_cosine(a: &InteractionMatrix, b: &InteractionMatrix) -> f64 {
    let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut dot = 0.0;
    let mut norm_small = 0.0;
    let mut norm_large = 0.0;
    for (target, weight) in smaller.iter() {
        if let Some(other) = larger.get(target) {
            dot += weight * other;
            norm_small += weight * weight;
            norm_large += other * other;
        }
    }

    if norm_small == 0.0 || norm_large == 0.0 {
        0.0
    } else {
        dot / (norm_small.sqrt() * norm_large.sqrt())
    }
}
