//! # NavScore
//!
//! Navigation suggestion scoring for analytics dashboards.
//!
//! ## Features
//!
//! - Interaction tracking with global popularity and recency signals
//! - Collaborative filtering over similar users' navigation
//! - Content-based similarity over destination features
//! - Hybrid ranking with business-rule filtering and result caching

pub mod cli;
pub mod collaborative;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod hybrid;
pub mod interaction;
pub mod profile;
pub mod suggestion;

pub mod prelude {
    pub use crate::config::ScorerConfig;
    pub use crate::engine::{RecommendationEngine, RecommendationEngineBuilder};
    pub use crate::error::{NavScoreError, Result};
    pub use crate::hybrid::{Algorithm, RecommendationRequest, RecommendationResult};
    pub use crate::interaction::{Interaction, InteractionType};
    pub use crate::suggestion::ScoredSuggestion;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
