//! Content features of navigable destinations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Ordinal difficulty of a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn ordinal(self) -> u8 {
        match self {
            Complexity::Low => 0,
            Complexity::Medium => 1,
            Complexity::High => 2,
        }
    }

    /// 1.0 for equal levels, 0.5 one step apart, 0.0 at opposite ends.
    pub fn closeness(self, other: Complexity) -> f64 {
        let distance = self.ordinal().abs_diff(other.ordinal()) as f64;
        1.0 - distance / 2.0
    }
}

/// What a destination is about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentFeatures {
    pub category: String,
    pub complexity: Complexity,
    pub data_types: BTreeSet<String>,
    pub business_function: String,
    keywords: Vec<String>,
}

impl ContentFeatures {
    pub fn new<C, B, I, D>(
        category: C,
        complexity: Complexity,
        data_types: I,
        business_function: B,
    ) -> Self
    where
        C: Into<String>,
        B: Into<String>,
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        let data_types: BTreeSet<String> = data_types.into_iter().map(Into::into).collect();
        let keywords = derive_keywords(&data_types);
        Self {
            category: category.into(),
            complexity,
            data_types,
            business_function: business_function.into(),
            keywords,
        }
    }

    /// Lower-cased search keywords derived from the data types.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

fn derive_keywords(data_types: &BTreeSet<String>) -> Vec<String> {
    let mut keywords = BTreeSet::new();
    for data_type in data_types {
        let lowered = data_type.to_lowercase();
        for part in lowered.split(['_', '-', ' ']).filter(|part| !part.is_empty()) {
            keywords.insert(part.to_string());
        }
        keywords.insert(lowered);
    }
    keywords.into_iter().collect()
}

/// Descriptor of a suggested destination, as handed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Destination {
    /// A destination known only by its path.
    pub fn from_path<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            title: None,
            category: None,
        }
    }
}

/// One catalog row: a destination and its features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CatalogRecord", into = "CatalogRecord")]
pub struct CatalogEntry {
    pub path: String,
    pub title: String,
    pub features: ContentFeatures,
}

impl CatalogEntry {
    pub fn new<P: Into<String>, T: Into<String>>(
        path: P,
        title: T,
        features: ContentFeatures,
    ) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            features,
        }
    }

    pub fn destination(&self) -> Destination {
        Destination {
            path: self.path.clone(),
            title: Some(self.title.clone()),
            category: Some(self.features.category.clone()),
        }
    }
}

/// Flat on-disk form of a catalog entry. Keywords are never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogRecord {
    path: String,
    #[serde(default)]
    title: String,
    category: String,
    complexity: Complexity,
    #[serde(default)]
    data_types: Vec<String>,
    business_function: String,
}

impl From<CatalogRecord> for CatalogEntry {
    fn from(record: CatalogRecord) -> Self {
        let title = if record.title.is_empty() {
            record.path.clone()
        } else {
            record.title
        };
        CatalogEntry {
            path: record.path,
            title,
            features: ContentFeatures::new(
                record.category,
                record.complexity,
                record.data_types,
                record.business_function,
            ),
        }
    }
}

impl From<CatalogEntry> for CatalogRecord {
    fn from(entry: CatalogEntry) -> Self {
        CatalogRecord {
            path: entry.path,
            title: entry.title,
            category: entry.features.category,
            complexity: entry.features.complexity,
            data_types: entry.features.data_types.into_iter().collect(),
            business_function: entry.features.business_function,
        }
    }
}
