//! User preference source consulted for tie-breaking.

use std::fmt::Debug;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Display and style preferences of a user.
///
/// Never scored; only used to order suggestions whose scores are equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub preferred_categories: Vec<String>,
}

impl UserPreferences {
    pub fn prefers(&self, category: Option<&str>) -> bool {
        category.is_some_and(|category| {
            self.preferred_categories
                .iter()
                .any(|preferred| preferred == category)
        })
    }
}

/// Read-only lookup of user preferences.
pub trait ProfileSource: Send + Sync + Debug {
    fn preferences(&self, user_id: &str) -> Result<Option<UserPreferences>>;
}

/// Preferences held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileSource {
    profiles: AHashMap<String, UserPreferences>,
}

impl InMemoryProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile<S: Into<String>>(
        mut self,
        user_id: S,
        preferences: UserPreferences,
    ) -> Self {
        self.profiles.insert(user_id.into(), preferences);
        self
    }
}

impl ProfileSource for InMemoryProfileSource {
    fn preferences(&self, user_id: &str) -> Result<Option<UserPreferences>> {
        Ok(self.profiles.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers() {
        let preferences = UserPreferences {
            preferred_categories: vec!["marketing".to_string()],
        };
        assert!(preferences.prefers(Some("marketing")));
        assert!(!preferences.prefers(Some("financial")));
        assert!(!preferences.prefers(None));
    }

    #[test]
    fn test_in_memory_source() {
        let source = InMemoryProfileSource::new().with_profile(
            "u1",
            UserPreferences {
                preferred_categories: vec!["analytics".to_string()],
            },
        );
        assert!(source.preferences("u1").unwrap().is_some());
        assert!(source.preferences("u2").unwrap().is_none());
    }
}
