//! Shared application store.
//!
//! Maps application ids to records. Reads and writes go through an async
//! `RwLock`; each update closure runs under a single write guard, so a
//! transition is applied atomically per record.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::types::ApplicationRecord;

#[derive(Debug, Clone, Default)]
pub struct AppStore {
    records: Arc<RwLock<HashMap<String, ApplicationRecord>>>,
}

impl AppStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with catalog records.
    pub fn from_records(records: impl IntoIterator<Item = ApplicationRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }

    /// Inserts or replaces a record. Last write wins.
    pub async fn insert(&self, record: ApplicationRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    /// Returns a copy of a record.
    pub async fn get(&self, id: &str) -> Option<ApplicationRecord> {
        self.records.read().await.get(id).cloned()
    }

    /// Returns true if a record with this id exists.
    pub async fn contains(&self, id: &str) -> bool {
        self.records.read().await.contains_key(id)
    }

    /// All ids, sorted for stable iteration.
    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Copies of every record, sorted by id.
    pub async fn snapshot(&self) -> Vec<ApplicationRecord> {
        let mut records: Vec<ApplicationRecord> =
            self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    /// Number of records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Runs `f` on a record under the write lock.
    ///
    /// Returns `None` when the id is unknown.
    pub async fn update<R>(&self, id: &str, f: impl FnOnce(&mut ApplicationRecord) -> R) -> Option<R> {
        let mut records = self.records.write().await;
        records.get_mut(id).map(f)
    }

    /// Writes a discovered installed version.
    pub async fn set_current_version(&self, id: &str, version: String) -> bool {
        let updated = self
            .update(id, |record| record.current_version = Some(version))
            .await
            .is_some();
        if !updated {
            debug!(app = %id, "Version discovered for an application not in the store");
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::state::Trigger;

    fn store() -> AppStore {
        AppStore::from_records([
            ApplicationRecord::new("b", "Browser"),
            ApplicationRecord::new("a", "Authenticator"),
        ])
    }

    #[tokio::test]
    async fn test_ids_and_snapshot_are_sorted() {
        let store = store();
        assert_eq!(store.ids().await, vec!["a".to_string(), "b".to_string()]);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot[0].name, "Authenticator");
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_update_unknown_returns_none() {
        let store = store();
        assert!(store.update("zzz", |_| ()).await.is_none());
        assert!(!store.set_current_version("zzz", "v1.0.0".to_string()).await);
    }

    #[tokio::test]
    async fn test_update_applies_transition() {
        let store = store();
        let transition = store
            .update("a", |record| record.apply_trigger(Trigger::Download))
            .await
            .unwrap();
        assert!(transition.is_applied());
        assert!(store.get("a").await.unwrap().is_downloading_and_installing());
    }

    #[tokio::test]
    async fn test_insert_replaces() {
        let store = AppStore::new();
        assert!(store.is_empty().await);

        store.insert(ApplicationRecord::new("a", "Old")).await;
        store.insert(ApplicationRecord::new("a", "New")).await;
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("a").await.unwrap().name, "New");
    }

    #[tokio::test]
    async fn test_set_current_version() {
        let store = store();
        assert!(store.set_current_version("b", "v0.4.0".to_string()).await);
        assert_eq!(
            store.get("b").await.unwrap().current_version.as_deref(),
            Some("v0.4.0")
        );
    }
}
