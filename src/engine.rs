//! The recommendation engine service.
//!
//! [`RecommendationEngine`] owns the interaction store, the feature index, the
//! scorers and the result cache. The host application constructs one instance
//! and shares it (it is `Send + Sync`); there is no global state.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use navscore::engine::RecommendationEngine;
//! use navscore::hybrid::RecommendationRequest;
//! use navscore::interaction::{Interaction, InteractionType};
//!
//! # fn main() -> navscore::error::Result<()> {
//! let engine = RecommendationEngine::builder().build()?;
//!
//! engine.track_interaction(
//!     "user-1",
//!     &Interaction::new(InteractionType::Export, "/revenue", Utc::now()),
//! );
//!
//! let request = RecommendationRequest::new("/revenue", Utc::now()).with_user("user-1");
//! let result = engine.generate_recommendations(&request);
//! assert!(result.suggestions.iter().all(|s| s.destination.path != "/revenue"));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Instant;

use ahash::AHashSet;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::collaborative::{CollaborativeOutcome, CollaborativeScorer};
use crate::config::ScorerConfig;
use crate::content::index::{FeatureIndex, FeatureSource, StaticFeatureSource};
use crate::content::profile::ContentProfile;
use crate::content::scorer::ContentScorer;
use crate::error::Result;
use crate::hybrid::cache::{CacheKey, RecommendationCache};
use crate::hybrid::combiner::HybridCombiner;
use crate::hybrid::types::{
    MODEL_VERSION, RecommendationMetadata, RecommendationRequest, RecommendationResult,
};
use crate::interaction::{Interaction, InteractionRecord, InteractionStore};
use crate::profile::{ProfileSource, UserPreferences};
use crate::suggestion::ScoredSuggestion;

/// Builder for [`RecommendationEngine`].
#[derive(Debug, Default)]
pub struct RecommendationEngineBuilder {
    config: Option<ScorerConfig>,
    feature_source: Option<Arc<dyn FeatureSource>>,
    profile_source: Option<Arc<dyn ProfileSource>>,
}

impl RecommendationEngineBuilder {
    pub fn config(mut self, config: ScorerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Catalog loader; defaults to the built-in dashboard catalog.
    pub fn feature_source(mut self, source: Arc<dyn FeatureSource>) -> Self {
        self.feature_source = Some(source);
        self
    }

    pub fn profile_source(mut self, source: Arc<dyn ProfileSource>) -> Self {
        self.profile_source = Some(source);
        self
    }

    /// Validate the configuration and load the feature index.
    pub fn build(self) -> Result<RecommendationEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let feature_source = self
            .feature_source
            .unwrap_or_else(|| Arc::new(StaticFeatureSource::builtin()));
        let index = FeatureIndex::load(feature_source.as_ref())?;

        Ok(RecommendationEngine {
            store: InteractionStore::new(&config.interaction),
            features: RwLock::new(Arc::new(index)),
            collaborative: CollaborativeScorer::new(config.collaborative.clone()),
            content: ContentScorer::new(config.content.clone()),
            combiner: HybridCombiner::new(config.hybrid.clone()),
            cache: RecommendationCache::new(&config.cache),
            feature_source,
            profile_source: self.profile_source,
            config,
        })
    }
}

/// Navigation suggestion service.
#[derive(Debug)]
pub struct RecommendationEngine {
    config: ScorerConfig,
    store: InteractionStore,
    features: RwLock<Arc<FeatureIndex>>,
    feature_source: Arc<dyn FeatureSource>,
    profile_source: Option<Arc<dyn ProfileSource>>,
    collaborative: CollaborativeScorer,
    content: ContentScorer,
    combiner: HybridCombiner,
    cache: RecommendationCache,
}

impl RecommendationEngine {
    pub fn builder() -> RecommendationEngineBuilder {
        RecommendationEngineBuilder::default()
    }

    /// Engine with an explicit configuration and catalog loader.
    pub fn new(config: ScorerConfig, feature_source: Arc<dyn FeatureSource>) -> Result<Self> {
        Self::builder()
            .config(config)
            .feature_source(feature_source)
            .build()
    }

    /// Ranked suggestions for one request.
    ///
    /// Never fails: missing signal or a failing collaborator degrades to
    /// fewer (possibly zero) suggestions.
    pub fn generate_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> RecommendationResult {
        let started = Instant::now();
        let now = request.timestamp;

        let cache_key = match &request.user_id {
            Some(user_id) if self.config.cache.enabled => Some(CacheKey::new(
                user_id.clone(),
                request.context.current_page.clone(),
                request.session_id.clone(),
            )),
            _ => None,
        };
        if let Some(key) = &cache_key
            && let Some(cached) = self.cache.get(key, now)
        {
            let pages: AHashSet<&str> = request_pages(request).collect();
            if cached.suggestions.iter().all(|s| !pages.contains(s.path())) {
                log::debug!("cache hit for user {} on {}", key.user_id, key.current_page);
                return cached;
            }
            log::debug!(
                "cached result for user {} on {} suggests a page already visited, rescoring",
                key.user_id,
                key.current_page
            );
        }

        let index = self.feature_index();
        let recent_visits = self.recent_visits(request);
        let history: AHashSet<String> =
            recent_visits.iter().map(|(path, _)| path.clone()).collect();

        let collaborative = match &request.user_id {
            Some(user_id) => self.collaborative_candidates(user_id, &history),
            None => CollaborativeOutcome::default(),
        };
        let content = self.content_candidates(request, &index, &recent_visits, &history);
        let preferences = self.preferences(request);

        let combined = self.combiner.combine(
            collaborative.suggestions,
            content,
            &history,
            self.store.signals(),
            &index,
            preferences.as_ref(),
            now,
        );

        let result = RecommendationResult {
            suggestions: combined.suggestions,
            algorithm: combined.algorithm,
            confidence: combined.confidence,
            explanations: combined.explanations,
            metadata: RecommendationMetadata {
                processing_time_ms: started.elapsed().as_millis() as u64,
                input_size: history.len(),
                candidate_count: combined.candidate_count,
                neighbor_count: collaborative.neighbor_count,
                model_version: MODEL_VERSION.to_string(),
            },
        };

        log::debug!(
            "generated {} suggestions for user {} on {} ({}, {} candidates)",
            result.suggestions.len(),
            request.user_id.as_deref().unwrap_or("anonymous"),
            request.context.current_page,
            result.algorithm,
            result.metadata.candidate_count
        );

        if let Some(key) = cache_key {
            self.cache.insert(key, result.clone(), now);
        }
        result
    }

    /// Record an interaction and drop the user's cached results.
    pub fn track_interaction(
        &self,
        user_id: &str,
        interaction: &Interaction,
    ) -> InteractionRecord {
        let record = self.store.record_interaction(user_id, interaction);
        let invalidated = self.cache.invalidate_user(user_id);
        log::trace!(
            "tracked {} on {} for user {user_id}, invalidated {invalidated} cached results",
            interaction.interaction_type,
            interaction.target
        );
        record
    }

    /// Reload the catalog from the feature source. On failure the current
    /// catalog stays in place.
    pub fn refresh_features(&self) -> Result<usize> {
        match FeatureIndex::load(self.feature_source.as_ref()) {
            Ok(index) => {
                let count = index.len();
                *self.features.write() = Arc::new(index);
                self.cache.clear();
                Ok(count)
            }
            Err(e) => {
                log::warn!(
                    "feature refresh from {} failed, keeping {} destinations: {e}",
                    self.feature_source.name(),
                    self.features.read().len()
                );
                Err(e)
            }
        }
    }

    pub fn feature_index(&self) -> Arc<FeatureIndex> {
        self.features.read().clone()
    }

    pub fn store(&self) -> &InteractionStore {
        &self.store
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Drop expired cached results. Returns the number removed.
    pub fn cleanup_cache(&self, now: DateTime<Utc>) -> usize {
        self.cache.cleanup_expired(now)
    }

    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    /// Forget all interactions, signals and cached results.
    pub fn clear(&self) {
        self.store.clear();
        self.cache.clear();
    }

    /// Request pages (weight 1.0 each) followed by the user's recent events
    /// at their interaction weight, oldest first.
    fn recent_visits(&self, request: &RecommendationRequest) -> Vec<(String, f64)> {
        let mut visits: Vec<(String, f64)> = request_pages(request)
            .map(|page| (page.to_string(), 1.0))
            .collect();
        if let Some(user_id) = &request.user_id {
            visits.extend(
                self.store
                    .recent_events(user_id, request.timestamp)
                    .into_iter()
                    .map(|event| (event.target, event.weight)),
            );
        }
        visits
    }

    fn collaborative_candidates(
        &self,
        user_id: &str,
        history: &AHashSet<String>,
    ) -> CollaborativeOutcome {
        let users = self.store.snapshot();
        self.collaborative.score(user_id, &users, history)
    }

    fn content_candidates(
        &self,
        request: &RecommendationRequest,
        index: &FeatureIndex,
        recent_visits: &[(String, f64)],
        history: &AHashSet<String>,
    ) -> Vec<ScoredSuggestion> {
        if index.is_empty() {
            log::warn!(
                "feature index is empty, skipping content scoring for user {}",
                request.user_id.as_deref().unwrap_or("anonymous")
            );
            return Vec::new();
        }

        let mut profile = ContentProfile::from_weighted_visits(
            index,
            recent_visits
                .iter()
                .map(|(path, weight)| (path.as_str(), *weight)),
        );
        if profile.known_visits == 0
            && let Some(query) = &request.context.query
        {
            profile = ContentProfile::from_query(index, query);
        }

        self.content.score(&profile, index, history)
    }

    fn preferences(&self, request: &RecommendationRequest) -> Option<UserPreferences> {
        if let Some(profile) = &request.profile {
            return Some(profile.clone());
        }

        let user_id = request.user_id.as_deref()?;
        let source = self.profile_source.as_ref()?;
        match source.preferences(user_id) {
            Ok(preferences) => preferences,
            Err(e) => {
                log::warn!("profile lookup failed for user {user_id}: {e}");
                None
            }
        }
    }
}

/// Pages named by the request itself: the session history and the current page.
fn request_pages(request: &RecommendationRequest) -> impl Iterator<Item = &str> {
    let current = request.context.current_page.as_str();
    request
        .context
        .previous_pages
        .iter()
        .map(String::as_str)
        .chain((!current.is_empty()).then_some(current))
}
