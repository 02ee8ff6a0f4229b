//! Content-based side of the scorer.
//!
//! - [`features`]: what a destination "is about"
//! - [`index`]: the catalog of destinations and the loaders that populate it
//! - [`profile`]: a synthetic profile built from a user's recent visits
//! - [`scorer`]: profile-to-destination similarity

pub mod features;
pub mod index;
pub mod profile;
pub mod scorer;

pub use features::{CatalogEntry, Complexity, ContentFeatures, Destination};
pub use index::{FeatureIndex, FeatureSource, JsonFeatureSource, StaticFeatureSource};
pub use profile::ContentProfile;
pub use scorer::ContentScorer;
