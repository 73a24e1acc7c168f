//! Portal configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the portal works with zero
//! configuration.

use std::path::PathBuf;
use std::time::Duration;

use gamemaster_shared::catalog::Catalog;
use gamemaster_shared::constants::{
    AUTOSAVE_INTERVAL_SECS, LOGIN_POLL_INTERVAL_SECS, LOGIN_PROMPT_AUTO_CLOSE_SECS,
    LOGIN_PROMPT_COOLDOWN_SECS, LOGIN_PROMPT_DELAY_SECS,
};
use gamemaster_shared::error::CatalogError;
use gamemaster_store::Database;

/// Timer settings for [`GameProgressTracker`](crate::tracker::GameProgressTracker).
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Env: `GAMEMASTER_AUTOSAVE_SECS`
    /// Default: 30 s
    pub autosave_interval: Duration,

    /// Env: `GAMEMASTER_LOGIN_POLL_SECS`
    /// Default: 1 s
    pub login_poll_interval: Duration,

    pub prompt_delay: Duration,
    pub prompt_auto_close: Duration,
    pub prompt_cooldown: chrono::Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(AUTOSAVE_INTERVAL_SECS),
            login_poll_interval: Duration::from_secs(LOGIN_POLL_INTERVAL_SECS),
            prompt_delay: Duration::from_secs(LOGIN_PROMPT_DELAY_SECS),
            prompt_auto_close: Duration::from_secs(LOGIN_PROMPT_AUTO_CLOSE_SECS),
            prompt_cooldown: chrono::Duration::seconds(LOGIN_PROMPT_COOLDOWN_SECS),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PortalConfig {
    /// Directory holding `gamemaster.db`.
    /// Env: `GAMEMASTER_DATA_DIR`
    /// Default: platform data directory.
    pub data_dir: Option<PathBuf>,

    /// JSON catalog file.
    /// Env: `GAMEMASTER_CATALOG`
    /// Default: built-in catalog.
    pub catalog_path: Option<PathBuf>,

    /// Required `aud` claim on federated ID tokens.
    /// Env: `GAMEMASTER_IDENTITY_AUDIENCE`
    /// Default: not checked.
    pub identity_audience: Option<String>,

    pub tracker: TrackerConfig,
}

impl PortalConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("GAMEMASTER_DATA_DIR").filter(|d| !d.is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(path) = lookup("GAMEMASTER_CATALOG").filter(|p| !p.is_empty()) {
            config.catalog_path = Some(PathBuf::from(path));
        }

        if let Some(aud) = lookup("GAMEMASTER_IDENTITY_AUDIENCE").filter(|a| !a.is_empty()) {
            config.identity_audience = Some(aud);
        }

        if let Some(secs) = parse_secs(&lookup, "GAMEMASTER_AUTOSAVE_SECS") {
            config.tracker.autosave_interval = secs;
        }

        if let Some(secs) = parse_secs(&lookup, "GAMEMASTER_LOGIN_POLL_SECS") {
            config.tracker.login_poll_interval = secs;
        }

        config
    }

    pub fn open_database(&self) -> gamemaster_store::Result<Database> {
        match &self.data_dir {
            Some(dir) => Database::open_in_dir(dir),
            None => Database::new(),
        }
    }

    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Catalog::builtin(),
        }
    }
}

// Positive whole seconds; anything else is ignored with a warning.
fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Some(Duration::from_secs(n)),
        _ => {
            tracing::warn!(key, value = %raw, "invalid interval, using default");
            None
        }
    }
}
