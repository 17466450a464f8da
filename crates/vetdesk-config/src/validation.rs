// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL schemes and bounded cache settings.

use crate::diagnostic::ConfigError;
use crate::model::VetdeskConfig;

/// Longest staleness window a query may use, in seconds.
pub const MAX_STALE_SECS: u64 = 300;

/// Most retries a query may make after its first attempt.
pub const MAX_RETRIES: u32 = 3;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every error instead of failing fast.
pub fn validate_config(config: &VetdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "api.base_url", &config.api.base_url, &["http", "https"]);

    if config.api.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.realtime.enabled {
        check_url(&mut errors, "realtime.url", &config.realtime.url, &["ws", "wss"]);
    }

    if let Some(push) = &config.realtime.push_service_url {
        check_url(&mut errors, "realtime.push_service_url", push, &["http", "https"]);
    }

    if config.auth.credentials_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "auth.credentials_path must not be empty".to_string(),
        });
    }

    if config.cache.default_stale_secs > MAX_STALE_SECS {
        errors.push(ConfigError::Validation {
            message: format!(
                "cache.default_stale_secs must be at most {MAX_STALE_SECS}, got {}",
                config.cache.default_stale_secs
            ),
        });
    }

    if config.cache.retries > MAX_RETRIES {
        errors.push(ConfigError::Validation {
            message: format!(
                "cache.retries must be at most {MAX_RETRIES}, got {}",
                config.cache.retries
            ),
        });
    }

    if config.notifications.max_retained == 0 {
        errors.push(ConfigError::Validation {
            message: "notifications.max_retained must be at least 1".to_string(),
        });
    }

    let level = config.app.log_level.to_ascii_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` is not one of trace, debug, info, warn, error",
                config.app.log_level
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that `value` is `scheme://host...` with one of the allowed schemes.
fn check_url(errors: &mut Vec<ConfigError>, key: &str, value: &str, schemes: &[&str]) {
    let trimmed = value.trim();
    let Some((scheme, rest)) = trimmed.split_once("://") else {
        errors.push(ConfigError::Validation {
            message: format!("{key} `{trimmed}` is not an absolute URL"),
        });
        return;
    };

    if !schemes.contains(&scheme.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "{key} must use one of {} but uses `{scheme}`",
                schemes.join("/")
            ),
        });
    }

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: format!("{key} `{trimmed}` has no host"),
        });
    }
}
