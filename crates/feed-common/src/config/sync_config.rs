//! Sync core configuration
//!
//! Loads from `FEEDSYNC_*` environment variables (with `.env` support via
//! dotenvy) and falls back to serde defaults for everything unset.

use serde::Deserialize;

/// Configuration for the sync core
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Items per feed page when the caller does not specify
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Hard cap on requested page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Logical time-to-live for a status, in hours
    #[serde(default = "default_status_ttl_hours")]
    pub status_ttl_hours: i64,

    /// Unread counts above this render as "cap+" (the internal count is
    /// never capped)
    #[serde(default = "default_unread_display_cap")]
    pub unread_display_cap: u64,

    /// Buffer size for subscription fanout channels
    #[serde(default = "default_subscription_buffer")]
    pub subscription_buffer: usize,

    /// How many recent notifications to backfill on attach
    #[serde(default = "default_notification_backfill")]
    pub notification_backfill: usize,
}

fn default_page_size() -> usize {
    20
}

fn default_max_page_size() -> usize {
    100
}

fn default_status_ttl_hours() -> i64 {
    24
}

fn default_unread_display_cap() -> u64 {
    99
}

fn default_subscription_buffer() -> usize {
    256
}

fn default_notification_backfill() -> usize {
    50
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            status_ttl_hours: default_status_ttl_hours(),
            unread_display_cap: default_unread_display_cap(),
            subscription_buffer: default_subscription_buffer(),
            notification_backfill: default_notification_backfill(),
        }
    }
}

/// Error loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl SyncConfig {
    /// Load from the environment (`FEEDSYNC_DEFAULT_PAGE_SIZE` etc.)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let loaded: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix("FEEDSYNC"))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject configurations that would break pagination or expiry
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "default_page_size must be at least 1".into(),
            ));
        }
        if self.max_page_size < self.default_page_size {
            return Err(ConfigError::Invalid(
                "max_page_size must be >= default_page_size".into(),
            ));
        }
        if self.status_ttl_hours <= 0 {
            return Err(ConfigError::Invalid(
                "status_ttl_hours must be positive".into(),
            ));
        }
        if self.subscription_buffer == 0 {
            return Err(ConfigError::Invalid(
                "subscription_buffer must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Clamp a caller-requested page size into the configured bounds
    #[must_use]
    pub fn clamp_page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }
}
