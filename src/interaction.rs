//! Interaction store: the raw behavioural signal behind every scorer.
//!
//! Each tracked interaction adds its weight to the user's
//! [`InteractionMatrix`], lands in a bounded recent-events window, and nudges
//! the global popularity and recency signals of its target.

pub mod signals;
pub mod store;
pub mod types;

pub use signals::{GlobalSignals, TargetSignal};
pub use store::InteractionStore;
pub use types::{Interaction, InteractionMatrix, InteractionRecord, InteractionType};
