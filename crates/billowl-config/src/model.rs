// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for billowl.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level billowl configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; the config surface is read-only at runtime.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BillowlConfig {
    /// Application-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Reminder scheduler settings.
    #[serde(default)]
    pub reminders: ReminderConfig,

    /// Notification presentation settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Application-wide configuration.
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

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("billowl").join("billowl.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("billowl.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Reminder scheduler configuration.
///
/// Read once when the reminder service is constructed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReminderConfig {
    /// Seconds between evaluation passes over unpaid bills.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// Minimum seconds between repeated notifications for the same bill.
    #[serde(default = "default_suppression_window_secs")]
    pub suppression_window_secs: u64,

    /// Re-notify inside the suppression window when a bill's urgency
    /// escalates (e.g. due-soon becomes overdue). Off by default:
    /// a bill is notified once until paid or snoozed.
    #[serde(default = "default_renotify_on_escalation")]
    pub renotify_on_escalation: bool,

    /// Default `reminder_days` assigned to newly created bills.
    #[serde(default = "default_reminder_days")]
    pub default_reminder_days: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            suppression_window_secs: default_suppression_window_secs(),
            renotify_on_escalation: default_renotify_on_escalation(),
            default_reminder_days: default_reminder_days(),
        }
    }
}

fn default_check_interval_secs() -> u64 {
    300 // 5 minutes
}

fn default_suppression_window_secs() -> u64 {
    86_400 // once per day
}

fn default_renotify_on_escalation() -> bool {
    false
}

fn default_reminder_days() -> u32 {
    3
}

/// Notification presentation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Maximum number of prompts displayed at once; further events queue
    /// until a prompt is dismissed.
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,

    /// Auto-dismiss prompts after this many seconds. `None` keeps prompts
    /// open until acted on.
    #[serde(default)]
    pub auto_close_secs: Option<u64>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            max_visible: default_max_visible(),
            auto_close_secs: None,
        }
    }
}

fn default_max_visible() -> usize {
    3
}
