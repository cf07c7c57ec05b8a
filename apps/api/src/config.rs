use anyhow::{bail, Context, Result};
use chrono::FixedOffset;

use crate::roasts::calendar::CalendarZone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub app_env: String,
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub enable_dev_auth: bool,
    pub jwt_secret: Option<String>,
    pub allowed_origins: Vec<String>,
    pub calendar_zone: CalendarZone,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5174".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            storage: parse_storage_kind(
                &std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "postgres".to_string()),
            )?,
            database_url: optional_env("DATABASE_URL"),
            enable_dev_auth: std::env::var("ENABLE_DEV_AUTH")
                .map(|v| v == "true")
                .unwrap_or(false),
            jwt_secret: optional_env("JWT_SECRET"),
            allowed_origins: parse_origins(
                &std::env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            ),
            calendar_zone: parse_calendar_zone(optional_env("CALENDAR_UTC_OFFSET_MINUTES"))?,
        })
    }

    /// The dev token bypass is only honored in the development environment.
    pub fn dev_auth_active(&self) -> bool {
        self.enable_dev_auth && self.app_env == "development"
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_storage_kind(raw: &str) -> Result<StorageKind> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "postgres" => Ok(StorageKind::Postgres),
        "memory" => Ok(StorageKind::Memory),
        other => bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_calendar_zone(raw: Option<String>) -> Result<CalendarZone> {
    let Some(raw) = raw else {
        return Ok(CalendarZone::Local);
    };
    let minutes: i32 = raw
        .trim()
        .parse()
        .context("CALENDAR_UTC_OFFSET_MINUTES must be an integer")?;
    let offset = minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!("CALENDAR_UTC_OFFSET_MINUTES out of range: {minutes}"))?;
    Ok(CalendarZone::Fixed(offset))
}
