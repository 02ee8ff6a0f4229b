//! Hybrid combination of all scoring signals.
//!
//! This module merges the collaborative and content-based candidate lists
//! with the global popularity and recency signals:
//! - Weighted sum of every signal per destination
//! - Business-rule filtering (score floor, no already-visited pages)
//! - Per-request result caching with early invalidation

pub mod cache;
pub mod combiner;
pub mod types;

pub use cache::{CacheKey, RecommendationCache};
pub use combiner::{CombinedSuggestions, HybridCombiner};
pub use types::{
    Algorithm, NavigationContext, RecommendationMetadata, RecommendationRequest,
    RecommendationResult,
};
