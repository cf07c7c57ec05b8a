use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::roasts::calendar::{year_month, CalendarZone};
use crate::roasts::errors::RoastError;
use crate::roasts::models::{CalendarView, Entry, EntryPatch, EntrySummary, Mood, StoredChanges};
use crate::roasts::storage::StorageBackend;

/// Domain rules for roasts: id generation, calendar fields, ownership.
///
/// The only caller of `StorageBackend`. Owner ids reaching this type are
/// already authenticated. There is no locking between the ownership check and
/// the write that follows it, so concurrent updates to one roast are
/// last-write-wins.
pub struct EntryService {
    storage: Arc<dyn StorageBackend>,
    zone: CalendarZone,
}

impl EntryService {
    pub fn new(storage: Arc<dyn StorageBackend>, zone: CalendarZone) -> Self {
        Self { storage, zone }
    }

    /// Roasts for one month, wrapped as `{ year: { month: [...] } }`.
    /// `month` must already be zero-padded.
    #[instrument(skip(self))]
    pub async fn get_calendar(
        &self,
        owner_id: &str,
        year: &str,
        month: &str,
    ) -> Result<CalendarView, RoastError> {
        let summaries: Vec<EntrySummary> = self
            .storage
            .list(owner_id, year, month)
            .await?
            .iter()
            .map(Entry::summary)
            .collect();

        let mut months = BTreeMap::new();
        months.insert(month.to_string(), summaries);
        let mut view = CalendarView::new();
        view.insert(year.to_string(), months);
        Ok(view)
    }

    #[instrument(skip(self, note))]
    pub async fn create_entry(
        &self,
        owner_id: &str,
        mood: Mood,
        note: Option<String>,
        occurred_at: i64,
    ) -> Result<EntrySummary, RoastError> {
        let ym = year_month(occurred_at, self.zone)?;
        let now = now_millis();

        let entry = Entry {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            mood,
            note,
            occurred_at,
            year: ym.year,
            month: ym.month,
            created_at: now,
            updated_at: now,
        };
        self.storage.put(owner_id, &entry).await?;

        info!(
            "Created roast {} for owner {owner_id} ({}-{})",
            entry.id, entry.year, entry.month
        );
        Ok(entry.summary())
    }

    #[instrument(skip(self, patch))]
    pub async fn update_entry(
        &self,
        owner_id: &str,
        entry_id: &str,
        patch: EntryPatch,
    ) -> Result<EntrySummary, RoastError> {
        let existing = self.ensure_owned(owner_id, entry_id, "update").await?;

        let mut changes = StoredChanges {
            mood: patch.mood,
            note: patch.note,
            occurred_at: patch.occurred_at,
            updated_at: Some(now_millis().max(existing.created_at)),
            ..Default::default()
        };
        if let Some(occurred_at) = patch.occurred_at {
            let ym = year_month(occurred_at, self.zone)?;
            changes.year = Some(ym.year);
            changes.month = Some(ym.month);
        }

        // The record can vanish between the check and the write.
        let updated = self
            .storage
            .patch(owner_id, entry_id, &changes)
            .await?
            .ok_or_else(|| RoastError::NotFound(entry_id.to_string()))?;

        info!("Updated roast {entry_id} for owner {owner_id}");
        Ok(updated.summary())
    }

    #[instrument(skip(self))]
    pub async fn delete_entry(&self, owner_id: &str, entry_id: &str) -> Result<(), RoastError> {
        self.ensure_owned(owner_id, entry_id, "delete").await?;
        let deleted = self.storage.remove(owner_id, entry_id).await?;
        info!("Deleted roast {entry_id} for owner {owner_id}: {deleted}");
        Ok(())
    }

    /// NotFound when nothing is stored at the key, Forbidden when the stored
    /// owner is someone else. The storage key alone is not trusted as proof of
    /// ownership.
    async fn ensure_owned(
        &self,
        owner_id: &str,
        entry_id: &str,
        action: &'static str,
    ) -> Result<Entry, RoastError> {
        let existing = self
            .storage
            .get(owner_id, entry_id)
            .await?
            .ok_or_else(|| {
                warn!("Rejected {action} of missing roast {entry_id} by owner {owner_id}");
                RoastError::NotFound(entry_id.to_string())
            })?;

        if existing.owner_id != owner_id {
            warn!(
                "Rejected {action} of roast {entry_id}: requested by {owner_id}, owned by {}",
                existing.owner_id
            );
            return Err(RoastError::Forbidden { action });
        }
        Ok(existing)
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
