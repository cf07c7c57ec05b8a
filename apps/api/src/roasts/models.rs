use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::roasts::errors::RoastError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Excited,
    Ok,
    Tired,
    Sad,
    Angry,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Excited => "excited",
            Mood::Ok => "ok",
            Mood::Tired => "tired",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
        }
    }
}

impl FromStr for Mood {
    type Err = RoastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excited" => Ok(Mood::Excited),
            "ok" => Ok(Mood::Ok),
            "tired" => Ok(Mood::Tired),
            "sad" => Ok(Mood::Sad),
            "angry" => Ok(Mood::Angry),
            other => Err(RoastError::Corrupt(format!("unknown mood '{other}'"))),
        }
    }
}

/// A stored roast: one mood record for one owner at one moment.
///
/// `year` and `month` are derived from `occurred_at` and are only ever written
/// through `roasts::calendar::year_month`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub owner_id: String,
    pub mood: Mood,
    pub note: Option<String>,
    /// Epoch milliseconds.
    pub occurred_at: i64,
    pub year: String,
    pub month: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entry {
    pub fn summary(&self) -> EntrySummary {
        EntrySummary {
            id: self.id.clone(),
            mood: self.mood,
            note: self.note.clone(),
            occurred_at: self.occurred_at,
        }
    }
}

/// What callers get back: owner, derived fields and timestamps stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySummary {
    pub id: String,
    pub mood: Mood,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub occurred_at: i64,
}

/// Caller-supplied partial update. Omitted fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub mood: Option<Mood>,
    pub note: Option<String>,
    pub occurred_at: Option<i64>,
}

/// Fields merged into a stored record by `StorageBackend::patch`.
///
/// Built only by `EntryService`, which fills `year`/`month` whenever
/// `occurred_at` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredChanges {
    pub mood: Option<Mood>,
    pub note: Option<String>,
    pub occurred_at: Option<i64>,
    pub year: Option<String>,
    pub month: Option<String>,
    pub updated_at: Option<i64>,
}

impl StoredChanges {
    pub fn apply_to(&self, entry: &mut Entry) {
        if let Some(mood) = self.mood {
            entry.mood = mood;
        }
        if let Some(note) = &self.note {
            entry.note = Some(note.clone());
        }
        if let Some(occurred_at) = self.occurred_at {
            entry.occurred_at = occurred_at;
        }
        if let Some(year) = &self.year {
            entry.year = year.clone();
        }
        if let Some(month) = &self.month {
            entry.month = month.clone();
        }
        if let Some(updated_at) = self.updated_at {
            entry.updated_at = updated_at;
        }
    }
}

/// `year -> month -> summaries`, serialized as nested JSON objects.
pub type CalendarView = BTreeMap<String, BTreeMap<String, Vec<EntrySummary>>>;
