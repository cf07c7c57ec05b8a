use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use super::StorageBackend;
use crate::roasts::errors::RoastError;
use crate::roasts::models::{Entry, StoredChanges};

/// Durable backend. One row per `(owner_id, id)` in `roasts`, with every entry
/// field stored verbatim so month listings are plain equality filters.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoastRow {
    id: String,
    owner_id: String,
    mood: String,
    note: Option<String>,
    occurred_at: i64,
    year: String,
    month: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<RoastRow> for Entry {
    type Error = RoastError;

    fn try_from(row: RoastRow) -> Result<Self, Self::Error> {
        Ok(Entry {
            mood: row.mood.parse()?,
            id: row.id,
            owner_id: row.owner_id,
            note: row.note,
            occurred_at: row.occurred_at,
            year: row.year,
            month: row.month,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl StorageBackend for PgStorage {
    async fn list(
        &self,
        owner_id: &str,
        year: &str,
        month: &str,
    ) -> Result<Vec<Entry>, RoastError> {
        let rows = sqlx::query_as::<_, RoastRow>(
            r#"
            SELECT * FROM roasts
            WHERE owner_id = $1 AND year = $2 AND month = $3
            ORDER BY occurred_at ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .bind(year)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            "Retrieved {} roasts for owner {owner_id} ({year}-{month})",
            rows.len()
        );
        rows.into_iter().map(Entry::try_from).collect()
    }

    async fn get(&self, owner_id: &str, entry_id: &str) -> Result<Option<Entry>, RoastError> {
        sqlx::query_as::<_, RoastRow>("SELECT * FROM roasts WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(entry_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Entry::try_from)
            .transpose()
    }

    async fn put(&self, owner_id: &str, entry: &Entry) -> Result<(), RoastError> {
        sqlx::query(
            r#"
            INSERT INTO roasts
                (owner_id, id, mood, note, occurred_at, year, month, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (owner_id, id) DO UPDATE SET
                mood = EXCLUDED.mood,
                note = EXCLUDED.note,
                occurred_at = EXCLUDED.occurred_at,
                year = EXCLUDED.year,
                month = EXCLUDED.month,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&entry.id)
        .bind(entry.mood.as_str())
        .bind(&entry.note)
        .bind(entry.occurred_at)
        .bind(&entry.year)
        .bind(&entry.month)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;

        debug!("Stored roast {} for owner {owner_id}", entry.id);
        Ok(())
    }

    async fn patch(
        &self,
        owner_id: &str,
        entry_id: &str,
        changes: &StoredChanges,
    ) -> Result<Option<Entry>, RoastError> {
        let row = sqlx::query_as::<_, RoastRow>(
            r#"
            UPDATE roasts SET
                mood = COALESCE($3, mood),
                note = COALESCE($4, note),
                occurred_at = COALESCE($5, occurred_at),
                year = COALESCE($6, year),
                month = COALESCE($7, month),
                updated_at = COALESCE($8, updated_at)
            WHERE owner_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(entry_id)
        .bind(changes.mood.map(|m| m.as_str()))
        .bind(&changes.note)
        .bind(changes.occurred_at)
        .bind(&changes.year)
        .bind(&changes.month)
        .bind(changes.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        debug!("Patched roast {entry_id} for owner {owner_id}: {}", row.is_some());
        row.map(Entry::try_from).transpose()
    }

    async fn remove(&self, owner_id: &str, entry_id: &str) -> Result<bool, RoastError> {
        let result = sqlx::query("DELETE FROM roasts WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(entry_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        debug!("Deleted roast {entry_id} for owner {owner_id}: {deleted}");
        Ok(deleted)
    }
}
