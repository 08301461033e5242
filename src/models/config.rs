//! Application configuration structures.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings shared by every collaborator
    #[serde(default)]
    pub http: HttpConfig,

    /// Open-data feed location
    #[serde(default)]
    pub feed: FeedConfig,

    /// Target calendar
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Token storage
    #[serde(default)]
    pub auth: AuthConfig,

    /// Refresh behaviour
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration, or defaults if the file does not exist.
    ///
    /// An unreadable or unparseable file is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(&path) {
            Err(AppError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("No config at {:?}. Using defaults.", path.as_ref());
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Apply `CHABAN_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup("CHABAN_CALENDAR_ID") {
            self.calendar.calendar_id = id;
        }
        if let Some(rows) = lookup("CHABAN_FEED_ROWS").and_then(|v| v.parse().ok()) {
            self.feed.rows = rows;
        }
        if let Some(secs) = lookup("CHABAN_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.http.timeout_secs = secs;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.feed.url)
            .map_err(|e| AppError::validation(format!("feed.url is invalid: {e}")))?;
        if self.feed.dataset.trim().is_empty() {
            return Err(AppError::validation("feed.dataset is empty"));
        }
        if self.feed.rows == 0 {
            return Err(AppError::validation("feed.rows must be > 0"));
        }
        if self.calendar.calendar_id.trim().is_empty() {
            return Err(AppError::validation("calendar.calendar_id is empty"));
        }
        url::Url::parse(&self.calendar.api_base)
            .map_err(|e| AppError::validation(format!("calendar.api_base is invalid: {e}")))?;
        if self.calendar.max_concurrent_deletes == 0 {
            return Err(AppError::validation(
                "calendar.max_concurrent_deletes must be > 0",
            ));
        }
        if self.sync.max_drop_percent > 100 {
            return Err(AppError::validation(
                "sync.max_drop_percent must be within 0..=100",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Open-data search endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Search endpoint URL (without query string)
    #[serde(default = "defaults::feed_url")]
    pub url: String,

    /// Dataset identifier
    #[serde(default = "defaults::dataset")]
    pub dataset: String,

    /// Page size
    #[serde(default = "defaults::rows")]
    pub rows: usize,

    /// Optional facet requested alongside the records
    #[serde(default = "defaults::facet")]
    pub facet: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: defaults::feed_url(),
            dataset: defaults::dataset(),
            rows: defaults::rows(),
            facet: defaults::facet(),
        }
    }
}

/// Target calendar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Identifier of the shared calendar
    #[serde(default = "defaults::calendar_id")]
    pub calendar_id: String,

    /// Calendar API base URL
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Maximum deletions in flight while clearing the calendar
    #[serde(default = "defaults::max_concurrent_deletes")]
    pub max_concurrent_deletes: usize,

    /// Delay between inserts in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: defaults::calendar_id(),
            api_base: defaults::api_base(),
            max_concurrent_deletes: defaults::max_concurrent_deletes(),
            request_delay_ms: 0,
        }
    }
}

/// Token storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Storage key of the authorized-user token file
    #[serde(default = "defaults::token_key")]
    pub token_key: String,

    /// Token endpoint used when the file does not name one
    #[serde(default = "defaults::token_url")]
    pub token_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_key: defaults::token_key(),
            token_url: defaults::token_url(),
        }
    }
}

/// Refresh behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fetch and transform the whole batch before deleting anything
    #[serde(default)]
    pub transform_before_clear: bool,

    /// Largest accepted drop in event count when replacing the calendar
    #[serde(default = "defaults::max_drop_percent")]
    pub max_drop_percent: u8,

    /// Below this many published events the drop check is skipped
    #[serde(default = "defaults::min_baseline")]
    pub min_baseline: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            transform_before_clear: false,
            max_drop_percent: defaults::max_drop_percent(),
            min_baseline: defaults::min_baseline(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        concat!("chaban-sync/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Feed defaults
    pub fn feed_url() -> String {
        "https://opendata.bordeaux-metropole.fr/api/records/1.0/search/".into()
    }
    pub fn dataset() -> String {
        "previsions_pont_chaban".into()
    }
    pub fn rows() -> usize {
        1000
    }
    pub fn facet() -> Option<String> {
        Some("bateau".into())
    }

    // Calendar defaults
    pub fn calendar_id() -> String {
        "l0a0e0fpad2g935k1dco82a1u4@group.calendar.google.com".into()
    }
    pub fn api_base() -> String {
        "https://www.googleapis.com/calendar/v3".into()
    }
    pub fn max_concurrent_deletes() -> usize {
        4
    }

    // Auth defaults
    pub fn token_key() -> String {
        ".env/token.json".into()
    }
    pub fn token_url() -> String {
        "https://oauth2.googleapis.com/token".into()
    }

    // Sync defaults
    pub fn max_drop_percent() -> u8 {
        80
    }
    pub fn min_baseline() -> usize {
        10
    }
}
