//! Global per-destination popularity and recency signals.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::config::InteractionConfig;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Signal state for one destination.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSignal {
    /// Popularity in [0, 1].
    pub popularity: f64,
    /// Most recent interaction with the destination, by anyone.
    pub last_seen: DateTime<Utc>,
    pub interactions: u64,
}

/// Popularity and recency shared by all users.
///
/// Every update is a read-increment-write on a single entry under one lock.
#[derive(Debug)]
pub struct GlobalSignals {
    growth: f64,
    increment: f64,
    half_life_hours: f64,
    entries: Mutex<AHashMap<String, TargetSignal>>,
}

impl GlobalSignals {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            growth: config.popularity_growth,
            increment: config.popularity_increment,
            half_life_hours: config.recency_half_life_hours,
            entries: Mutex::new(AHashMap::new()),
        }
    }

    /// Nudge popularity for `target` and refresh its last-seen time.
    pub fn record(&self, target: &str, weight: f64, timestamp: DateTime<Utc>) {
        let mut entries = self.entries.lock();
        let signal = entries
            .entry(target.to_string())
            .or_insert_with(|| TargetSignal {
                popularity: 0.0,
                last_seen: timestamp,
                interactions: 0,
            });

        signal.popularity =
            (signal.popularity * self.growth + self.increment * weight.max(0.0)).min(1.0);
        signal.interactions += 1;
        if timestamp > signal.last_seen {
            signal.last_seen = timestamp;
        }
    }

    pub fn popularity(&self, target: &str) -> f64 {
        self.entries
            .lock()
            .get(target)
            .map(|signal| signal.popularity)
            .unwrap_or(0.0)
    }

    /// Exponential decay of the time since the last interaction with `target`.
    ///
    /// 1.0 for interactions at or after `now`, halves every half-life, and 0.0
    /// for destinations nobody has touched.
    pub fn recency(&self, target: &str, now: DateTime<Utc>) -> f64 {
        let Some(last_seen) = self.entries.lock().get(target).map(|s| s.last_seen) else {
            return 0.0;
        };

        let age_seconds = (now - last_seen).num_seconds().max(0) as f64;
        let age_hours = age_seconds / SECONDS_PER_HOUR;
        (-age_hours * std::f64::consts::LN_2 / self.half_life_hours).exp()
    }

    pub fn get(&self, target: &str) -> Option<TargetSignal> {
        self.entries.lock().get(target).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
