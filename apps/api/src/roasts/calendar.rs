//! Calendar placement of a roast timestamp.
//!
//! `year_month` is the one place `year`/`month` are computed. Both the create
//! and update paths go through it so the stored index can never drift from
//! `occurred_at`.

use chrono::{DateTime, Datelike, FixedOffset, Local, Offset, TimeZone, Utc};

use crate::roasts::errors::RoastError;

/// Which wall clock a timestamp is read against when deriving its calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarZone {
    /// The process's local time zone, including its DST rules for that instant.
    Local,
    Fixed(FixedOffset),
}

impl CalendarZone {
    pub fn utc() -> Self {
        CalendarZone::Fixed(Utc.fix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearMonth {
    /// Four digits, e.g. "2024".
    pub year: String,
    /// Zero-padded, "01" through "12".
    pub month: String,
}

/// Derives the stored `year`/`month` pair for an epoch-millisecond timestamp.
pub fn year_month(occurred_at: i64, zone: CalendarZone) -> Result<YearMonth, RoastError> {
    let (year, month) = match zone {
        CalendarZone::Local => fields(Local.timestamp_millis_opt(occurred_at).single()),
        CalendarZone::Fixed(offset) => fields(offset.timestamp_millis_opt(occurred_at).single()),
    }
    .ok_or(RoastError::InvalidTimestamp(occurred_at))?;

    if !(0..=9999).contains(&year) {
        return Err(RoastError::InvalidTimestamp(occurred_at));
    }

    Ok(YearMonth {
        year: format!("{year:04}"),
        month: format!("{month:02}"),
    })
}

fn fields<Tz: TimeZone>(dt: Option<DateTime<Tz>>) -> Option<(i32, u32)> {
    dt.map(|dt| (dt.year(), dt.month()))
}
