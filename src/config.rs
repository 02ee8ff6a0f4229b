//! Configuration for the navigation suggestion scorer.
//!
//! Every tunable of the pipeline lives in one typed [`ScorerConfig`] built
//! once at startup. Defaults match the values the dashboard has always used;
//! a JSON file may override any subset of them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NavScoreError, Result};

/// Longest accepted recent-events retention: ten years.
pub const MAX_RETENTION_HOURS: i64 = 24 * 365 * 10;

/// Longest accepted cache time to live: one year.
pub const MAX_CACHE_TTL_SECONDS: i64 = 60 * 60 * 24 * 365;

/// Top-level configuration for the recommendation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScorerConfig {
    /// Interaction store configuration.
    pub interaction: InteractionConfig,
    /// Collaborative filtering configuration.
    pub collaborative: CollaborativeConfig,
    /// Content-based filtering configuration.
    pub content: ContentConfig,
    /// Hybrid combiner configuration.
    pub hybrid: HybridConfig,
    /// Result cache configuration.
    pub cache: CacheConfig,
}

impl ScorerConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: ScorerConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field for values the scorers cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.interaction.validate()?;
        self.collaborative.validate()?;
        self.content.validate()?;
        self.hybrid.validate()?;
        self.cache.validate()
    }
}

/// Configuration for the interaction store and its global signals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// How long raw events stay in a user's recent-events window.
    pub retention_hours: i64,
    /// Hard cap on the number of events kept per user.
    pub max_recent_events: usize,
    /// Multiplicative part of the popularity nudge.
    pub popularity_growth: f64,
    /// Additive part of the popularity nudge, scaled by interaction weight.
    pub popularity_increment: f64,
    /// Half-life of the recency signal.
    pub recency_half_life_hours: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            retention_hours: 24,
            max_recent_events: 500,
            popularity_growth: 1.05,
            popularity_increment: 0.01,
            recency_half_life_hours: 24.0,
        }
    }
}

impl InteractionConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=MAX_RETENTION_HOURS).contains(&self.retention_hours) {
            return Err(NavScoreError::config(format!(
                "retention_hours must be in [1, {MAX_RETENTION_HOURS}], got {}",
                self.retention_hours
            )));
        }
        if self.max_recent_events == 0 {
            return Err(NavScoreError::config("max_recent_events must be positive"));
        }
        if self.popularity_growth < 1.0 || !self.popularity_growth.is_finite() {
            return Err(NavScoreError::config("popularity_growth must be >= 1.0"));
        }
        check_unit("popularity_increment", self.popularity_increment)?;
        if self.recency_half_life_hours <= 0.0 || !self.recency_half_life_hours.is_finite() {
            return Err(NavScoreError::config(
                "recency_half_life_hours must be positive",
            ));
        }
        Ok(())
    }
}

/// Configuration for the collaborative scorer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollaborativeConfig {
    /// Neighbours must have a similarity strictly above this value.
    pub similarity_threshold: f64,
    /// Maximum number of neighbours kept.
    pub max_neighbors: usize,
    /// Below this many neighbours the scorer produces nothing.
    pub min_neighbors: usize,
    /// Applied once per neighbour contribution.
    pub decay_factor: f64,
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            max_neighbors: 50,
            min_neighbors: 3,
            decay_factor: 0.95,
        }
    }
}

impl CollaborativeConfig {
    fn validate(&self) -> Result<()> {
        check_unit("similarity_threshold", self.similarity_threshold)?;
        check_unit("decay_factor", self.decay_factor)?;
        if self.max_neighbors == 0 {
            return Err(NavScoreError::config("max_neighbors must be positive"));
        }
        if self.min_neighbors > self.max_neighbors {
            return Err(NavScoreError::config(format!(
                "min_neighbors ({}) exceeds max_neighbors ({})",
                self.min_neighbors, self.max_neighbors
            )));
        }
        Ok(())
    }
}

/// Configuration for the content-based scorer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    pub category_weight: f64,
    pub data_types_weight: f64,
    pub business_function_weight: f64,
    pub complexity_weight: f64,
    /// Destinations scoring below this value are dropped.
    pub min_score: f64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            category_weight: 0.3,
            data_types_weight: 0.25,
            business_function_weight: 0.25,
            complexity_weight: 0.2,
            min_score: 0.4,
        }
    }
}

impl ContentConfig {
    fn validate(&self) -> Result<()> {
        check_unit("category_weight", self.category_weight)?;
        check_unit("data_types_weight", self.data_types_weight)?;
        check_unit("business_function_weight", self.business_function_weight)?;
        check_unit("complexity_weight", self.complexity_weight)?;
        check_unit("content min_score", self.min_score)
    }
}

/// Configuration for the hybrid combiner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HybridConfig {
    pub collaborative_weight: f64,
    pub content_weight: f64,
    pub popularity_weight: f64,
    pub recency_weight: f64,
    /// Candidates scoring at or below this value are dropped.
    pub min_score: f64,
    /// Maximum number of suggestions returned.
    pub max_suggestions: usize,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            collaborative_weight: 0.4,
            content_weight: 0.3,
            popularity_weight: 0.2,
            recency_weight: 0.1,
            min_score: 0.3,
            max_suggestions: 10,
        }
    }
}

impl HybridConfig {
    fn validate(&self) -> Result<()> {
        check_unit("collaborative_weight", self.collaborative_weight)?;
        check_unit("content_weight", self.content_weight)?;
        check_unit("popularity_weight", self.popularity_weight)?;
        check_unit("recency_weight", self.recency_weight)?;
        check_unit("hybrid min_score", self.min_score)?;
        if self.max_suggestions == 0 {
            return Err(NavScoreError::config("max_suggestions must be positive"));
        }
        Ok(())
    }

    /// Highest score a suggestion can reach: every signal at 1.0.
    pub fn max_score(&self) -> f64 {
        self.collaborative_weight
            + self.content_weight
            + self.popularity_weight
            + self.recency_weight
    }
}

/// Configuration for the recommendation result cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Disable to compute every request from scratch.
    pub enabled: bool,
    /// Time to live of a cached result.
    pub ttl_seconds: i64,
    /// Upper bound on cached results.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 15 * 60,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=MAX_CACHE_TTL_SECONDS).contains(&self.ttl_seconds) {
            return Err(NavScoreError::config(format!(
                "cache ttl_seconds must be in [1, {MAX_CACHE_TTL_SECONDS}], got {}",
                self.ttl_seconds
            )));
        }
        if self.max_entries == 0 {
            return Err(NavScoreError::config("cache max_entries must be positive"));
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(NavScoreError::config(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_scorer_config_default() {
        let config = ScorerConfig::default();
        assert_eq!(config.collaborative.similarity_threshold, 0.3);
        assert_eq!(config.collaborative.max_neighbors, 50);
        assert_eq!(config.collaborative.min_neighbors, 3);
        assert_eq!(config.collaborative.decay_factor, 0.95);
        assert_eq!(config.content.min_score, 0.4);
        assert_eq!(config.hybrid.max_suggestions, 10);
        assert_eq!(config.cache.ttl_seconds, 900);
        assert_eq!(config.interaction.retention_hours, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hybrid_max_score() {
        let config = HybridConfig::default();
        assert!((config.max_score() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_out_of_range_weight() {
        let mut config = ScorerConfig::default();
        config.hybrid.content_weight = 1.5;
        assert!(matches!(config.validate(), Err(NavScoreError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_neighbor_bounds() {
        let mut config = ScorerConfig::default();
        config.collaborative.min_neighbors = 10;
        config.collaborative.max_neighbors = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unrepresentable_durations() {
        let mut config = ScorerConfig::default();
        config.interaction.retention_hours = i64::MAX / 2;
        assert!(matches!(config.validate(), Err(NavScoreError::Config(_))));

        let mut config = ScorerConfig::default();
        config.cache.ttl_seconds = i64::MAX;
        assert!(matches!(config.validate(), Err(NavScoreError::Config(_))));

        let mut config = ScorerConfig::default();
        config.interaction.retention_hours = MAX_RETENTION_HOURS;
        config.cache.ttl_seconds = MAX_CACHE_TTL_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"hybrid": {{"max_suggestions": 3}}, "cache": {{"ttl_seconds": 60}}}}"#
        )
        .unwrap();

        let config = ScorerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.hybrid.max_suggestions, 3);
        assert_eq!(config.hybrid.collaborative_weight, 0.4);
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.collaborative, CollaborativeConfig::default());
    }
}
