//! Sync engine configuration
//!
//! # Environment variables
//!
//! Every setting can be overridden from the environment:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | SWELL_REMOTE_URL | http://localhost:54321 | Remote store base URL |
//! | SWELL_API_KEY | (empty) | Remote store API key |
//! | SWELL_DATA_DIR | ./data | Directory holding the mirror snapshot |
//! | SWELL_STATE_KEY | surf_school_state | Snapshot file name (without `.json`) |
//! | SWELL_SYNC_INDICATOR_MS | 800 | Delay before the syncing indicator clears |
//! | SWELL_RECONNECT_INITIAL_SECS | 5 | First change-feed reconnect delay |
//! | SWELL_RECONNECT_MAX_SECS | 120 | Reconnect delay cap |
//! | SWELL_REQUEST_TIMEOUT_SECS | 30 | HTTP request timeout |
//! | SWELL_ADMIN_USERNAME | admin | Bootstrap admin username |
//! | SWELL_ADMIN_PASSWORD | admin | Bootstrap admin secret |
//! | SWELL_WEBSITE_API_URL | (unset) | Booking feed URL, seeds the mirror setting |
//! | SWELL_LOG_LEVEL | info | Log filter when `RUST_LOG` is unset |
//! | SWELL_LOG_DIR | (unset) | Daily-rolling log file directory |
//!
//! ```ignore
//! SWELL_REMOTE_URL=https://xyz.supabase.co SWELL_API_KEY=... swell-sync run
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use swell_gateway::GatewayConfig;

use crate::mirror::DEFAULT_STATE_KEY;

/// Bootstrap administrator identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub id: String,
    pub username: String,
    pub name: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            id: "admin-fixed-id".into(),
            username: "admin".into(),
            name: "Surf School Admin".into(),
            password: "admin".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub remote_url: String,
    pub api_key: String,
    pub data_dir: PathBuf,
    pub state_key: String,
    pub sync_indicator_ms: u64,
    pub reconnect_initial_secs: u64,
    pub reconnect_max_secs: u64,
    pub request_timeout_secs: u64,
    pub admin: AdminConfig,
    pub website_api_url: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl SyncConfig {
    /// Load from the process environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let admin_defaults = AdminConfig::default();

        Self {
            remote_url: string("SWELL_REMOTE_URL", "http://localhost:54321"),
            api_key: string("SWELL_API_KEY", ""),
            data_dir: PathBuf::from(string("SWELL_DATA_DIR", "./data")),
            state_key: string("SWELL_STATE_KEY", DEFAULT_STATE_KEY),
            sync_indicator_ms: parsed(&lookup, "SWELL_SYNC_INDICATOR_MS", 800),
            reconnect_initial_secs: parsed(&lookup, "SWELL_RECONNECT_INITIAL_SECS", 5),
            reconnect_max_secs: parsed(&lookup, "SWELL_RECONNECT_MAX_SECS", 120),
            request_timeout_secs: parsed(&lookup, "SWELL_REQUEST_TIMEOUT_SECS", 30),
            admin: AdminConfig {
                username: optional("SWELL_ADMIN_USERNAME")
                    .map(|u| u.trim().to_lowercase())
                    .unwrap_or(admin_defaults.username),
                password: optional("SWELL_ADMIN_PASSWORD").unwrap_or(admin_defaults.password),
                ..admin_defaults
            },
            website_api_url: optional("SWELL_WEBSITE_API_URL"),
            log_level: string("SWELL_LOG_LEVEL", "info"),
            log_dir: optional("SWELL_LOG_DIR"),
        }
    }

    /// Gateway settings derived from this configuration
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(self.remote_url.clone())
            .with_api_key(self.api_key.clone())
            .with_timeout(self.request_timeout_secs)
    }

    pub fn sync_indicator_delay(&self) -> Duration {
        Duration::from_millis(self.sync_indicator_ms)
    }

    pub fn reconnect_initial(&self) -> Duration {
        Duration::from_secs(self.reconnect_initial_secs.max(1))
    }

    pub fn reconnect_max(&self) -> Duration {
        Duration::from_secs(self.reconnect_max_secs).max(self.reconnect_initial())
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
