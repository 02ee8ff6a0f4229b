//! Concurrent per-user interaction store.

use std::collections::VecDeque;
use std::sync::Arc;

use ahash::AHashMap;
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};

use crate::config::{InteractionConfig, MAX_RETENTION_HOURS};
use crate::interaction::signals::GlobalSignals;
use crate::interaction::types::{Interaction, InteractionMatrix, InteractionRecord};

#[derive(Debug, Default)]
struct UserInteractions {
    matrix: InteractionMatrix,
    recent: VecDeque<InteractionRecord>,
    latest: Option<DateTime<Utc>>,
}

impl UserInteractions {
    fn push(&mut self, record: InteractionRecord, retention: Duration, max_events: usize) {
        self.matrix.add(&record.target, record.weight);

        let latest = match self.latest {
            Some(latest) if latest >= record.timestamp => latest,
            _ => record.timestamp,
        };
        self.latest = Some(latest);
        self.recent.push_back(record);

        if let Some(cutoff) = latest.checked_sub_signed(retention) {
            self.recent.retain(|event| event.timestamp >= cutoff);
        }
        while self.recent.len() > max_events {
            self.recent.pop_front();
        }
    }
}

/// Per-user interaction matrices, recent-events windows and global signals.
///
/// Each user has its own mutex: writers for different users never contend,
/// writers for the same user are serialised.
#[derive(Debug)]
pub struct InteractionStore {
    retention: Duration,
    max_recent_events: usize,
    users: RwLock<AHashMap<String, Arc<Mutex<UserInteractions>>>>,
    signals: GlobalSignals,
}

impl InteractionStore {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            retention: Duration::hours(
                config.retention_hours.clamp(1, MAX_RETENTION_HOURS),
            ),
            max_recent_events: config.max_recent_events,
            users: RwLock::new(AHashMap::new()),
            signals: GlobalSignals::new(config),
        }
    }

    /// Record one interaction and return the stored record.
    pub fn record_interaction(
        &self,
        user_id: &str,
        interaction: &Interaction,
    ) -> InteractionRecord {
        if !interaction.interaction_type.is_known() {
            log::debug!(
                "unrecognised interaction type '{}' from user {} on {}, using weight 1.0",
                interaction.interaction_type,
                user_id,
                interaction.target
            );
        }

        let record = InteractionRecord {
            user_id: user_id.to_string(),
            target: interaction.target.clone(),
            weight: interaction.interaction_type.weight(),
            timestamp: interaction.timestamp,
        };

        let entry = self.user_entry(user_id);
        entry
            .lock()
            .push(record.clone(), self.retention, self.max_recent_events);

        self.signals
            .record(&record.target, record.weight, record.timestamp);

        record
    }

    fn user_entry(&self, user_id: &str) -> Arc<Mutex<UserInteractions>> {
        if let Some(entry) = self.users.read().get(user_id) {
            return entry.clone();
        }
        self.users
            .write()
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    /// Copy of the user's interaction matrix.
    pub fn matrix(&self, user_id: &str) -> Option<InteractionMatrix> {
        let entry = self.users.read().get(user_id).cloned()?;
        let matrix = entry.lock().matrix.clone();
        Some(matrix)
    }

    /// The user's events within the retention horizon of `now`, oldest first.
    pub fn recent_events(&self, user_id: &str, now: DateTime<Utc>) -> Vec<InteractionRecord> {
        let Some(entry) = self.users.read().get(user_id).cloned() else {
            return Vec::new();
        };

        let cutoff = now
            .checked_sub_signed(self.retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        entry
            .lock()
            .recent
            .iter()
            .filter(|event| event.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    /// Matrices of every known user.
    pub fn snapshot(&self) -> Vec<(String, InteractionMatrix)> {
        let users = self.users.read();
        users
            .iter()
            .map(|(user_id, entry)| (user_id.clone(), entry.lock().matrix.clone()))
            .collect()
    }

    pub fn users(&self) -> Vec<String> {
        self.users.read().keys().cloned().collect()
    }

    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    pub fn popularity(&self, target: &str) -> f64 {
        self.signals.popularity(target)
    }

    pub fn recency(&self, target: &str, now: DateTime<Utc>) -> f64 {
        self.signals.recency(target, now)
    }

    pub fn signals(&self) -> &GlobalSignals {
        &self.signals
    }

    /// Drop everything stored for one user.
    pub fn evict_user(&self, user_id: &str) -> bool {
        self.users.write().remove(user_id).is_some()
    }

    /// Drop all users and global signals.
    pub fn clear(&self) {
        self.users.write().clear();
        self.signals.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::interaction::types::InteractionType;

    fn at(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(hour)
    }

    fn click(target: &str, hour: i64) -> Interaction {
        Interaction::new(InteractionType::Click, target, at(hour))
    }

    #[test]
    fn test_repeat_interactions_sum() {
        let store = InteractionStore::new(&InteractionConfig::default());
        store.record_interaction("u1", &Interaction::new(InteractionType::Export, "/revenue", at(0)));
        store.record_interaction("u1", &click("/revenue", 1));
        store.record_interaction("u1", &click("/customers", 1));

        let matrix = store.matrix("u1").unwrap();
        assert_eq!(matrix.get("/revenue"), Some(4.0));
        assert_eq!(matrix.get("/customers"), Some(1.0));
        assert!(store.matrix("u2").is_none());
    }

    #[test]
    fn test_unknown_type_is_recorded() {
        let store = InteractionStore::new(&InteractionConfig::default());
        let record = store.record_interaction(
            "u1",
            &Interaction::new(InteractionType::parse("hover"), "/reports", at(0)),
        );
        assert_eq!(record.weight, 1.0);
        assert_eq!(store.matrix("u1").unwrap().get("/reports"), Some(1.0));
    }

    #[test]
    fn test_recent_window_drops_old_events() {
        let store = InteractionStore::new(&InteractionConfig::default());
        store.record_interaction("u1", &click("/old", 0));
        store.record_interaction("u1", &click("/new", 30));

        let events = store.recent_events("u1", at(30));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, "/new");

        // The matrix keeps the aggregate even after the raw event expires.
        assert_eq!(store.matrix("u1").unwrap().get("/old"), Some(1.0));
    }

    #[test]
    fn test_recent_window_is_capped() {
        let config = InteractionConfig {
            max_recent_events: 3,
            ..InteractionConfig::default()
        };
        let store = InteractionStore::new(&config);
        for i in 0..5 {
            store.record_interaction("u1", &click(&format!("/page{i}"), 0));
        }

        let targets: Vec<String> = store
            .recent_events("u1", at(0))
            .into_iter()
            .map(|event| event.target)
            .collect();
        assert_eq!(targets, vec!["/page2", "/page3", "/page4"]);
    }

    #[test]
    fn test_oversized_retention_is_clamped() {
        let config = InteractionConfig {
            retention_hours: i64::MAX,
            ..InteractionConfig::default()
        };
        let store = InteractionStore::new(&config);
        store.record_interaction("u1", &click("/old", 0));
        store.record_interaction("u1", &click("/new", 24 * 365));

        assert_eq!(store.recent_events("u1", at(24 * 365)).len(), 2);
    }

    #[test]
    fn test_recording_updates_global_signals() {
        let store = InteractionStore::new(&InteractionConfig::default());
        store.record_interaction("u1", &click("/reports", 0));
        store.record_interaction("u2", &click("/reports", 0));

        assert!(store.popularity("/reports") > 0.0);
        assert!((store.recency("/reports", at(0)) - 1.0).abs() < 1e-12);
        assert_eq!(store.user_count(), 2);

        store.clear();
        assert_eq!(store.user_count(), 0);
        assert_eq!(store.popularity("/reports"), 0.0);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(InteractionStore::new(&InteractionConfig::default()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.record_interaction("shared", &click("/dashboard", 0));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.matrix("shared").unwrap().get("/dashboard"), Some(800.0));
        assert_eq!(store.signals().get("/dashboard").unwrap().interactions, 800);
    }
}
