//! Roast storage — a trait-based backend, swapped at startup via config.
//!
//! `MemoryStorage` keeps everything in process (lost on restart).
//! `PgStorage` persists to PostgreSQL.
//!
//! `AppState` holds the chosen backend inside `EntryService` as
//! `Arc<dyn StorageBackend>`. Neither backend checks ownership of a record;
//! that is `EntryService`'s job.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::roasts::errors::RoastError;
use crate::roasts::models::{Entry, StoredChanges};

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

/// Records are keyed by `(owner_id, entry.id)` and indexed by the stored
/// `(year, month)`.
///
/// Absence is never an error: `list` returns an empty vec and `get`/`patch`
/// return `None`. `list` is ordered by `occurred_at`, then `id`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn list(&self, owner_id: &str, year: &str, month: &str)
        -> Result<Vec<Entry>, RoastError>;

    async fn get(&self, owner_id: &str, entry_id: &str) -> Result<Option<Entry>, RoastError>;

    /// Inserts or fully overwrites the record at `(owner_id, entry.id)`.
    async fn put(&self, owner_id: &str, entry: &Entry) -> Result<(), RoastError>;

    /// Merges `changes` into the existing record. Derived fields are stored as
    /// given, never recomputed here.
    async fn patch(
        &self,
        owner_id: &str,
        entry_id: &str,
        changes: &StoredChanges,
    ) -> Result<Option<Entry>, RoastError>;

    /// Returns whether a record was deleted.
    async fn remove(&self, owner_id: &str, entry_id: &str) -> Result<bool, RoastError>;
}

pub(crate) fn sort_for_listing(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        a.occurred_at
            .cmp(&b.occurred_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
