use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{sort_for_listing, StorageBackend};
use crate::roasts::errors::RoastError;
use crate::roasts::models::{Entry, StoredChanges};

/// In-process backend for development and tests: `owner -> id -> Entry`.
///
/// All access goes through one `RwLock`; `patch` holds the write lock for the
/// whole read-merge-write.
pub struct MemoryStorage {
    inner: RwLock<HashMap<String, HashMap<String, Entry>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        warn!("Using in-memory roast storage; data will be lost on restart");
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn list(
        &self,
        owner_id: &str,
        year: &str,
        month: &str,
    ) -> Result<Vec<Entry>, RoastError> {
        let map = self.inner.read().await;
        let mut entries: Vec<Entry> = map
            .get(owner_id)
            .map(|owned| {
                owned
                    .values()
                    .filter(|e| e.year == year && e.month == month)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_for_listing(&mut entries);

        debug!(
            "Retrieved {} roasts for owner {owner_id} ({year}-{month})",
            entries.len()
        );
        Ok(entries)
    }

    async fn get(&self, owner_id: &str, entry_id: &str) -> Result<Option<Entry>, RoastError> {
        let map = self.inner.read().await;
        Ok(map.get(owner_id).and_then(|owned| owned.get(entry_id)).cloned())
    }

    async fn put(&self, owner_id: &str, entry: &Entry) -> Result<(), RoastError> {
        let mut map = self.inner.write().await;
        map.entry(owner_id.to_string())
            .or_default()
            .insert(entry.id.clone(), entry.clone());
        debug!("Stored roast {} for owner {owner_id}", entry.id);
        Ok(())
    }

    async fn patch(
        &self,
        owner_id: &str,
        entry_id: &str,
        changes: &StoredChanges,
    ) -> Result<Option<Entry>, RoastError> {
        let mut map = self.inner.write().await;
        let Some(existing) = map.get_mut(owner_id).and_then(|owned| owned.get_mut(entry_id)) else {
            return Ok(None);
        };
        changes.apply_to(existing);
        debug!("Patched roast {entry_id} for owner {owner_id}");
        Ok(Some(existing.clone()))
    }

    async fn remove(&self, owner_id: &str, entry_id: &str) -> Result<bool, RoastError> {
        let mut map = self.inner.write().await;
        let deleted = map
            .get_mut(owner_id)
            .map(|owned| owned.remove(entry_id).is_some())
            .unwrap_or(false);
        debug!("Deleted roast {entry_id} for owner {owner_id}: {deleted}");
        Ok(deleted)
    }
}
