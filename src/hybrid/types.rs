//! Request and result types of the recommendation engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::UserPreferences;
use crate::suggestion::ScoredSuggestion;

/// Version tag reported with every result.
pub const MODEL_VERSION: &str = "hybrid-1.0";

/// Where the user is and where they have been in this session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationContext {
    pub current_page: String,
    #[serde(default)]
    pub previous_pages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// A request for navigation suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    pub context: NavigationContext,
    /// Explicit preferences; take precedence over the profile source.
    #[serde(default)]
    pub profile: Option<UserPreferences>,
    pub timestamp: DateTime<Utc>,
}

impl RecommendationRequest {
    pub fn new<S: Into<String>>(current_page: S, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id: None,
            session_id: None,
            context: NavigationContext {
                current_page: current_page.into(),
                ..NavigationContext::default()
            },
            profile: None,
            timestamp,
        }
    }

    pub fn with_user<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_previous_pages<I, S>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context.previous_pages = pages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_query<S: Into<String>>(mut self, query: S) -> Self {
        self.context.query = Some(query.into());
        self
    }

    pub fn with_profile(mut self, profile: UserPreferences) -> Self {
        self.profile = Some(profile);
        self
    }
}

/// Which signal sources produced the suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Collaborative,
    ContentBased,
    Hybrid,
    /// Neither scorer produced a candidate.
    Fallback,
}

impl Algorithm {
    pub fn from_sources(collaborative: bool, content: bool) -> Self {
        match (collaborative, content) {
            (true, true) => Algorithm::Hybrid,
            (true, false) => Algorithm::Collaborative,
            (false, true) => Algorithm::ContentBased,
            (false, false) => Algorithm::Fallback,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Collaborative => "collaborative",
            Algorithm::ContentBased => "content_based",
            Algorithm::Hybrid => "hybrid",
            Algorithm::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationMetadata {
    pub processing_time_ms: u64,
    /// Size of the recent navigation history the request was scored against.
    pub input_size: usize,
    /// Distinct candidates before business-rule filtering.
    pub candidate_count: usize,
    pub neighbor_count: usize,
    pub model_version: String,
}

/// Ranked suggestions plus how they were produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub suggestions: Vec<ScoredSuggestion>,
    pub algorithm: Algorithm,
    /// Overall confidence in [0, 1]; 0 for empty results.
    pub confidence: f64,
    pub explanations: Vec<String>,
    pub metadata: RecommendationMetadata,
}

impl RecommendationResult {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}
