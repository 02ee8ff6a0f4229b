//! Command implementations for the navscore CLI.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::ScorerConfig;
use crate::content::{FeatureIndex, FeatureSource, JsonFeatureSource, StaticFeatureSource};
use crate::engine::RecommendationEngine;
use crate::error::{NavScoreError, Result};
use crate::hybrid::RecommendationRequest;
use crate::interaction::Interaction;
use crate::profile::UserPreferences;

/// One line of an interaction log.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggedInteraction {
    pub user_id: String,
    #[serde(flatten)]
    pub interaction: Interaction,
}

/// Execute a CLI command.
pub fn execute_command(args: NavScoreArgs) -> Result<()> {
    match &args.command {
        Command::Recommend(recommend_args) => recommend(recommend_args, &args),
        Command::Catalog(catalog_args) => list_catalog(catalog_args, &args),
    }
}

fn feature_source(catalog: Option<&Path>) -> Arc<dyn FeatureSource> {
    match catalog {
        Some(path) => Arc::new(JsonFeatureSource::new(path)),
        None => Arc::new(StaticFeatureSource::builtin()),
    }
}

/// Replay an interaction log and score one request.
fn recommend(args: &RecommendArgs, cli_args: &NavScoreArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ScorerConfig::from_json_file(path)?,
        None => ScorerConfig::default(),
    };
    let engine = RecommendationEngine::new(config, feature_source(args.catalog.as_deref()))?;

    let mut latest: Option<DateTime<Utc>> = None;
    if let Some(path) = &args.interactions {
        let logged = read_interactions(File::open(path)?)?;
        log::info!("replaying {} interactions from {}", logged.len(), path.display());
        for entry in &logged {
            engine.track_interaction(&entry.user_id, &entry.interaction);
            latest = latest.max(Some(entry.interaction.timestamp));
        }
    }

    let timestamp = match &args.at {
        Some(raw) => parse_timestamp(raw)?,
        None => latest.unwrap_or_else(Utc::now),
    };

    let mut request = RecommendationRequest::new(args.current_page.clone(), timestamp)
        .with_previous_pages(args.previous.iter().cloned());
    if let Some(user) = &args.user {
        request = request.with_user(user.clone());
    }
    if let Some(session) = &args.session {
        request = request.with_session(session.clone());
    }
    if let Some(query) = &args.query {
        request = request.with_query(query.clone());
    }
    if !args.prefer.is_empty() {
        request = request.with_profile(UserPreferences {
            preferred_categories: args.prefer.clone(),
        });
    }

    let result = engine.generate_recommendations(&request);
    output_result(&result, cli_args)
}

/// List the destinations of a catalog.
fn list_catalog(args: &CatalogArgs, cli_args: &NavScoreArgs) -> Result<()> {
    let source = feature_source(args.catalog.as_deref());
    let index = FeatureIndex::load(source.as_ref())?;

    let destinations = index
        .destinations()
        .filter(|entry| {
            args.category
                .as_deref()
                .is_none_or(|category| entry.features.category == category)
        })
        .cloned()
        .collect();

    let listing = CatalogListing {
        source: source.name().to_string(),
        destinations,
    };
    output_result(&listing, cli_args)
}

/// Parse a JSON-lines interaction log. Blank lines are ignored; malformed
/// lines are logged and skipped.
pub fn read_interactions<R: Read>(reader: R) -> Result<Vec<LoggedInteraction>> {
    let mut interactions = Vec::new();

    for (line_num, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LoggedInteraction>(&line) {
            Ok(entry) => interactions.push(entry),
            Err(e) => log::warn!("skipping interaction on line {}: {e}", line_num + 1),
        }
    }

    Ok(interactions)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| NavScoreError::invalid_argument(format!("invalid --at timestamp {raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractionType;

    #[test]
    fn test_read_interactions_skips_bad_lines() {
        let log = r#"{"user_id": "u1", "type": "click", "target": "/revenue", "timestamp": "2024-03-01T09:00:00Z"}

not json
{"user_id": "u2", "type": "hover", "target": "/analytics", "timestamp": "2024-03-01T09:05:00Z"}
"#;

        let entries = read_interactions(log.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].user_id, "u1");
        assert_eq!(entries[0].interaction.interaction_type, InteractionType::Click);
        assert_eq!(
            entries[1].interaction.interaction_type,
            InteractionType::Other("hover".to_string())
        );
    }

    #[test]
    fn test_parse_timestamp() {
        let parsed = parse_timestamp("2024-03-01T10:00:00+01:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T09:00:00+00:00");
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(NavScoreError::Other(_))
        ));
    }
}
