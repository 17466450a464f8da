// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the VetDesk clinic client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level VetDesk configuration.
///
/// All sections are optional and default to a backend on `localhost:3000`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VetdeskConfig {
    /// Process-level settings.
    #[serde(default)]
    pub app: AppConfig,

    /// REST backend settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Real-time socket and push service settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Credential storage settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Query cache defaults.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Notification center settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// REST backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto, including the `/api/v1` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Real-time socket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeConfig {
    /// Connect the socket at all. When false, notifications come from REST only.
    #[serde(default = "default_realtime_enabled")]
    pub enabled: bool,

    /// WebSocket URL of the real-time event stream.
    #[serde(default = "default_realtime_url")]
    pub url: String,

    /// Push-notification service URL. `None` disables push registration.
    #[serde(default)]
    pub push_service_url: Option<String>,

    /// Fixed delay between reconnect attempts, in seconds.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

impl RealtimeConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            enabled: default_realtime_enabled(),
            url: default_realtime_url(),
            push_service_url: None,
            reconnect_delay_secs: default_reconnect_delay_secs(),
        }
    }
}

fn default_realtime_enabled() -> bool {
    true
}

fn default_realtime_url() -> String {
    "ws://localhost:3000/ws".to_string()
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

/// Credential storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// JSON file holding the access and refresh tokens.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
        }
    }
}

fn default_credentials_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("vetdesk").join("credentials.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("credentials.json"))
        .to_string_lossy()
        .into_owned()
}

/// Query cache defaults. Individual queries may override the staleness window.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Staleness window for queries that do not set their own, in seconds (0-300).
    #[serde(default = "default_stale_secs")]
    pub default_stale_secs: u64,

    /// Retries for transient query failures (0-3).
    #[serde(default)]
    pub retries: u32,

    /// Fixed delay between retries, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_stale_secs: default_stale_secs(),
            retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_stale_secs() -> u64 {
    60
}

fn default_retry_delay_ms() -> u64 {
    1000
}

/// Notification center configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Maximum notifications kept in memory; the oldest are dropped first.
    #[serde(default = "default_max_retained")]
    pub max_retained: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            max_retained: default_max_retained(),
        }
    }
}

fn default_max_retained() -> usize {
    200
}
