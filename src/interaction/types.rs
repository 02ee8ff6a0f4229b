//! Interaction types and the per-user interaction matrix.

use std::fmt;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of user action on a destination.
///
/// Higher-commitment actions carry more weight. Unrecognised kinds are kept
/// as [`InteractionType::Other`] and weigh the same as a click, so no signal
/// is ever dropped because of an unexpected label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InteractionType {
    Click,
    Search,
    Filter,
    Export,
    Bookmark,
    Other(String),
}

impl InteractionType {
    /// Fixed weight of this interaction kind.
    pub fn weight(&self) -> f64 {
        match self {
            InteractionType::Click => 1.0,
            InteractionType::Search => 2.0,
            InteractionType::Filter => 1.5,
            InteractionType::Export => 3.0,
            InteractionType::Bookmark => 4.0,
            InteractionType::Other(_) => 1.0,
        }
    }

    /// Parse a label; never fails.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "click" => InteractionType::Click,
            "search" => InteractionType::Search,
            "filter" => InteractionType::Filter,
            "export" => InteractionType::Export,
            "bookmark" => InteractionType::Bookmark,
            _ => InteractionType::Other(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InteractionType::Click => "click",
            InteractionType::Search => "search",
            InteractionType::Filter => "filter",
            InteractionType::Export => "export",
            InteractionType::Bookmark => "bookmark",
            InteractionType::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, InteractionType::Other(_))
    }
}

impl From<String> for InteractionType {
    fn from(label: String) -> Self {
        InteractionType::parse(&label)
    }
}

impl From<InteractionType> for String {
    fn from(kind: InteractionType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An interaction event as reported by the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub target: String,
    pub timestamp: DateTime<Utc>,
}

impl Interaction {
    pub fn new<S: Into<String>>(
        interaction_type: InteractionType,
        target: S,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            interaction_type,
            target: target.into(),
            timestamp,
        }
    }
}

/// A stored, weighted observation. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_id: String,
    pub target: String,
    pub weight: f64,
    pub timestamp: DateTime<Utc>,
}

/// Accumulated interaction weight per target for one user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionMatrix {
    weights: AHashMap<String, f64>,
}

impl InteractionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to the running total of `target`.
    ///
    /// Negative or non-finite weights contribute nothing, so the matrix
    /// never holds a negative entry.
    pub fn add(&mut self, target: &str, weight: f64) {
        let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
        *self.weights.entry(target.to_string()).or_insert(0.0) += weight;
    }

    pub fn get(&self, target: &str) -> Option<f64> {
        self.weights.get(target).copied()
    }

    pub fn contains(&self, target: &str) -> bool {
        self.weights.contains_key(target)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(target, weight)| (target.as_str(), *weight))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for InteractionMatrix {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut matrix = InteractionMatrix::new();
        for (target, weight) in iter {
            matrix.add(&target.into(), weight);
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_weights() {
        assert_eq!(InteractionType::Click.weight(), 1.0);
        assert_eq!(InteractionType::Search.weight(), 2.0);
        assert_eq!(InteractionType::Filter.weight(), 1.5);
        assert_eq!(InteractionType::Export.weight(), 3.0);
        assert_eq!(InteractionType::Bookmark.weight(), 4.0);
    }

    #[test]
    fn test_unknown_type_defaults_to_unit_weight() {
        let kind = InteractionType::parse("hover");
        assert_eq!(kind, InteractionType::Other("hover".to_string()));
        assert!(!kind.is_known());
        assert_eq!(kind.weight(), 1.0);
        assert_eq!(InteractionType::parse(" Export "), InteractionType::Export);
    }

    #[test]
    fn test_interaction_type_serde() {
        let json = serde_json::to_string(&InteractionType::Bookmark).unwrap();
        assert_eq!(json, "\"bookmark\"");

        let parsed: InteractionType = serde_json::from_str("\"scroll\"").unwrap();
        assert_eq!(parsed, InteractionType::Other("scroll".to_string()));
    }

    #[test]
    fn test_matrix_accumulates() {
        let mut matrix = InteractionMatrix::new();
        matrix.add("/revenue", 3.0);
        matrix.add("/revenue", 1.0);
        matrix.add("/customers", 1.0);

        assert_eq!(matrix.get("/revenue"), Some(4.0));
        assert_eq!(matrix.get("/customers"), Some(1.0));
        assert_eq!(matrix.len(), 2);
        assert!(!matrix.contains("/analytics"));
    }

    #[test]
    fn test_matrix_never_negative() {
        let mut matrix = InteractionMatrix::new();
        matrix.add("/revenue", -5.0);
        matrix.add("/revenue", f64::NAN);
        assert_eq!(matrix.get("/revenue"), Some(0.0));
        assert!(matrix.iter().all(|(_, weight)| weight >= 0.0));
    }
}
