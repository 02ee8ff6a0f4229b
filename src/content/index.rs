//! Content feature index and the loaders that populate it.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashMap;

use crate::content::features::{CatalogEntry, Complexity, ContentFeatures, Destination};
use crate::error::{NavScoreError, Result};

/// Supplies catalog entries at startup or on refresh.
pub trait FeatureSource: Send + Sync + Debug {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Load the full catalog.
    fn load(&self) -> Result<Vec<CatalogEntry>>;
}

/// A feature source backed by entries held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticFeatureSource {
    entries: Vec<CatalogEntry>,
}

impl StaticFeatureSource {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The dashboard's default page catalog.
    pub fn builtin() -> Self {
        Self::new(builtin_catalog())
    }
}

impl FeatureSource for StaticFeatureSource {
    fn name(&self) -> &str {
        "static"
    }

    fn load(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.entries.clone())
    }
}

/// A feature source reading a JSON array of catalog entries from disk.
#[derive(Debug, Clone)]
pub struct JsonFeatureSource {
    path: PathBuf,
    name: String,
}

impl JsonFeatureSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = format!("json:{}", path.display());
        Self { path, name }
    }
}

impl FeatureSource for JsonFeatureSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<CatalogEntry>> {
        let raw = fs::read_to_string(&self.path)?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)?;
        Ok(entries)
    }
}

/// Lookup from destination path to its catalog entry.
///
/// Populated once from a [`FeatureSource`]; read-only afterwards. Insertion
/// order is kept so that iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    entries: Vec<CatalogEntry>,
    by_path: AHashMap<String, usize>,
}

impl FeatureIndex {
    /// Build an index, rejecting duplicate or empty paths.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut by_path = AHashMap::with_capacity(entries.len());

        for (position, entry) in entries.iter().enumerate() {
            if entry.path.trim().is_empty() {
                return Err(NavScoreError::catalog(format!(
                    "entry {position} has an empty path"
                )));
            }
            if by_path.insert(entry.path.clone(), position).is_some() {
                return Err(NavScoreError::catalog(format!(
                    "duplicate destination path {}",
                    entry.path
                )));
            }
        }

        Ok(Self { entries, by_path })
    }

    /// Load an index from a feature source.
    pub fn load(source: &dyn FeatureSource) -> Result<Self> {
        let entries = source.load()?;
        let index = Self::from_entries(entries)?;
        log::info!(
            "loaded {} destinations from feature source {}",
            index.len(),
            source.name()
        );
        Ok(index)
    }

    /// Index over the built-in dashboard catalog.
    pub fn builtin() -> Self {
        Self::from_entries(builtin_catalog()).unwrap_or_default()
    }

    pub fn get(&self, path: &str) -> Option<&CatalogEntry> {
        self.by_path.get(path).map(|&position| &self.entries[position])
    }

    pub fn get_features(&self, path: &str) -> Option<&ContentFeatures> {
        self.get(path).map(|entry| &entry.features)
    }

    /// Full descriptor for known paths, bare path otherwise.
    pub fn describe(&self, path: &str) -> Destination {
        self.get(path)
            .map(CatalogEntry::destination)
            .unwrap_or_else(|| Destination::from_path(path))
    }

    /// Destinations carrying `keyword` among their keywords.
    pub fn with_keyword<'a>(
        &'a self,
        keyword: &'a str,
    ) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.features.keywords().iter().any(|k| k == keyword))
    }

    pub fn destinations(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entry(
    path: &str,
    title: &str,
    category: &str,
    complexity: Complexity,
    data_types: &[&str],
    business_function: &str,
) -> CatalogEntry {
    CatalogEntry::new(
        path,
        title,
        ContentFeatures::new(
            category,
            complexity,
            data_types.iter().copied(),
            business_function,
        ),
    )
}

fn builtin_catalog() -> Vec<CatalogEntry> {
    use Complexity::*;

    vec![
        entry("/dashboard", "Dashboard", "overview", Low, &["kpis", "summary"], "monitoring"),
        entry("/revenue", "Revenue", "financial", Medium, &["revenue", "trends"], "finance"),
        entry("/expenses", "Expenses", "financial", Medium, &["expenses", "trends"], "finance"),
        entry(
            "/forecasting",
            "Forecasting",
            "financial",
            High,
            &["revenue", "forecasts", "trends"],
            "planning",
        ),
        entry(
            "/customers",
            "Customers",
            "customers",
            Medium,
            &["customer_data", "segments"],
            "sales",
        ),
        entry(
            "/audience-insights",
            "Audience Insights",
            "customers",
            High,
            &["demographics", "segments", "engagement"],
            "marketing",
        ),
        entry("/analytics", "Analytics", "analytics", High, &["data", "insights"], "analysis"),
        entry("/reports", "Reports", "analytics", Medium, &["reports", "data"], "analysis"),
        entry(
            "/marketing",
            "Marketing",
            "marketing",
            Medium,
            &["campaigns", "engagement"],
            "marketing",
        ),
        entry(
            "/content-automation",
            "Content Automation",
            "marketing",
            High,
            &["content", "campaigns", "schedules"],
            "marketing",
        ),
        entry(
            "/social-media",
            "Social Media",
            "marketing",
            Medium,
            &["social", "engagement"],
            "marketing",
        ),
        entry(
            "/health-monitoring",
            "Health Monitoring",
            "operations",
            Medium,
            &["metrics", "alerts"],
            "monitoring",
        ),
        entry(
            "/settings",
            "Settings",
            "administration",
            Low,
            &["preferences", "accounts"],
            "administration",
        ),
    ]
}
