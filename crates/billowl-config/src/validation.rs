// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and nonzero intervals.

use crate::diagnostic::ConfigError;
use crate::model::BillowlConfig;

const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &BillowlConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !KNOWN_LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level must be one of trace, debug, info, warn, error; got `{}`",
                config.app.log_level
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // tokio's interval panics on a zero period, so reject it here.
    if config.reminders.check_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "reminders.check_interval_secs must be at least 1".to_string(),
        });
    }

    if config.reminders.suppression_window_secs < config.reminders.check_interval_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "reminders.suppression_window_secs ({}) must not be shorter than \
                 reminders.check_interval_secs ({}), or every tick re-notifies",
                config.reminders.suppression_window_secs, config.reminders.check_interval_secs
            ),
        });
    }

    if config.notifications.max_visible == 0 {
        errors.push(ConfigError::Validation {
            message: "notifications.max_visible must be at least 1".to_string(),
        });
    }

    if let Some(secs) = config.notifications.auto_close_secs
        && secs == 0
    {
        errors.push(ConfigError::Validation {
            message: "notifications.auto_close_secs must be at least 1 when set".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
