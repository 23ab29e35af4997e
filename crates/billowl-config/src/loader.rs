// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./billowl.toml` > `~/.config/billowl/billowl.toml`
//! > `/etc/billowl/billowl.toml`, an explicit `BILLOWL_CONFIG` file override,
//! and environment variable overrides via the `BILLOWL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BillowlConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/billowl/billowl.toml` (system-wide)
/// 3. `~/.config/billowl/billowl.toml` (user XDG config)
/// 4. `./billowl.toml` (local directory)
/// 5. The file named by `BILLOWL_CONFIG`, when set
/// 6. `BILLOWL_*` environment variables
pub fn load_config() -> Result<BillowlConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<BillowlConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BillowlConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BillowlConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BillowlConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for
/// diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(BillowlConfig::default()))
        .merge(Toml::file("/etc/billowl/billowl.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("billowl/billowl.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("billowl.toml"));

    if let Ok(path) = std::env::var("BILLOWL_CONFIG") {
        figment = figment.merge(Toml::file(path));
    }

    figment.merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `BILLOWL_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    // BILLOWL_CONFIG names a file, not a config key; keep it out of the map.
    Env::prefixed("BILLOWL_").ignore(&["config"]).map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: BILLOWL_REMINDERS_CHECK_INTERVAL_SECS -> "reminders_check_interval_secs"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("reminders_", "reminders.", 1)
            .replacen("notifications_", "notifications.", 1);
        mapped.into()
    })
}
