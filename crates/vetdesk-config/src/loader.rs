// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vetdesk.toml` > `~/.config/vetdesk/vetdesk.toml` >
//! `/etc/vetdesk/vetdesk.toml` with environment variable overrides via `VETDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::debug;

use crate::model::VetdeskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vetdesk/vetdesk.toml`
/// 3. `~/.config/vetdesk/vetdesk.toml`
/// 4. `./vetdesk.toml`
/// 5. `VETDESK_*` environment variables
pub fn load_config() -> Result<VetdeskConfig, figment::Error> {
    build_figment().extract().map(resolved)
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<VetdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VetdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
        .map(resolved)
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VetdeskConfig, figment::Error> {
    debug!(path = %path.display(), exists = path.exists(), "loading explicit config file");
    Figment::new()
        .merge(Serialized::defaults(VetdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
        .map(resolved)
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(VetdeskConfig::default()));
    for path in search_paths() {
        debug!(path = %path.display(), exists = path.exists(), "config file candidate");
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Config files in merge order, lowest precedence first.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/vetdesk/vetdesk.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("vetdesk/vetdesk.toml"));
    }
    paths.push(PathBuf::from("vetdesk.toml"));
    paths
}

fn resolved(config: VetdeskConfig) -> VetdeskConfig {
    debug!(
        api = %config.api.base_url,
        realtime = %config.realtime.url,
        realtime_enabled = config.realtime.enabled,
        "configuration resolved"
    );
    config
}

/// Maps `VETDESK_SECTION_KEY` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that underscores inside
/// key names survive: `VETDESK_API_BASE_URL` is `api.base_url`, not `api.base.url`.
fn env_provider() -> Env {
    Env::prefixed("VETDESK_").map(|key| map_env_key(key.as_str()).into())
}

/// Section-to-dot mapping for a lowercased, prefix-stripped env var name.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: &[&str] = &["app", "api", "realtime", "auth", "cache", "notifications"];
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[traced_test]
    #[test]
    fn resolved_endpoints_are_logged() {
        let config = load_config_from_str(
            r#"
            [api]
            base_url = "http://clinic.test/api/v1"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://clinic.test/api/v1");
        assert!(logs_contain("configuration resolved"));
        assert!(logs_contain("http://clinic.test/api/v1"));
    }

    #[test]
    fn search_paths_end_with_working_directory() {
        let paths = search_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from("/etc/vetdesk/vetdesk.toml")));
        assert_eq!(paths.last(), Some(&PathBuf::from("vetdesk.toml")));
    }

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("api_base_url"), "api.base_url");
        assert_eq!(map_env_key("realtime_push_service_url"), "realtime.push_service_url");
        assert_eq!(map_env_key("cache_default_stale_secs"), "cache.default_stale_secs");
        assert_eq!(map_env_key("notifications_max_retained"), "notifications.max_retained");
    }

    #[test]
    fn unknown_section_passes_through() {
        assert_eq!(map_env_key("something_else"), "something_else");
    }
}
