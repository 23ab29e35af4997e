// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the billowl configuration system.

use billowl_config::diagnostic::{ConfigError, suggest_key};
use billowl_config::model::BillowlConfig;
use billowl_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_billowl_config() {
    let toml = r#"
[app]
log_level = "debug"

[storage]
database_path = "/tmp/bills.db"
wal_mode = false

[reminders]
check_interval_secs = 120
suppression_window_secs = 7200
renotify_on_escalation = true
default_reminder_days = 5

[notifications]
max_visible = 4
auto_close_secs = 45
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/bills.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.reminders.check_interval_secs, 120);
    assert_eq!(config.reminders.suppression_window_secs, 7200);
    assert!(config.reminders.renotify_on_escalation);
    assert_eq!(config.reminders.default_reminder_days, 5);
    assert_eq!(config.notifications.max_visible, 4);
    assert_eq!(config.notifications.auto_close_secs, Some(45));
}

/// Unknown field in [reminders] produces an UnknownField error.
#[test]
fn unknown_field_in_reminders_produces_error() {
    let toml = r#"
[reminders]
chck_interval_secs = 60
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("chck_interval_secs"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let toml = "";
    let config = load_config_from_str(toml).expect("empty TOML should use defaults");

    assert_eq!(config.app.log_level, "info");
    assert!(config.storage.database_path.ends_with("billowl.db"));
    assert!(config.storage.wal_mode);
    assert_eq!(config.reminders.check_interval_secs, 300);
    assert_eq!(config.reminders.suppression_window_secs, 86_400);
    assert!(!config.reminders.renotify_on_escalation);
    assert_eq!(config.reminders.default_reminder_days, 3);
    assert_eq!(config.notifications.max_visible, 3);
    assert!(config.notifications.auto_close_secs.is_none());
}

/// A later provider overrides reminders.check_interval_secs from TOML, the
/// way a BILLOWL_REMINDERS_CHECK_INTERVAL_SECS env var would.
#[test]
fn env_style_override_wins_over_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[reminders]
check_interval_secs = 600
"#;

    let config: BillowlConfig = Figment::new()
        .merge(Serialized::defaults(BillowlConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("reminders.check_interval_secs", 60))
        .extract()
        .expect("should merge override");

    assert_eq!(config.reminders.check_interval_secs, 60);
}

/// Dotted-path override maps to storage.database_path, not
/// storage.database.path.
#[test]
fn dotted_override_sets_database_path() {
    use figment::{Figment, providers::Serialized};

    let config: BillowlConfig = Figment::new()
        .merge(Serialized::defaults(BillowlConfig::default()))
        .merge(("storage.database_path", "/tmp/override.db"))
        .extract()
        .expect("should set database_path via dot notation");

    assert_eq!(config.storage.database_path, "/tmp/override.db");
}

/// Missing config files are silently skipped (Figment's Toml::file behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: BillowlConfig = Figment::new()
        .merge(Serialized::defaults(BillowlConfig::default()))
        .merge(Toml::file("/nonexistent/path/billowl.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.app.log_level, "info");
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[alerts]
sound = true
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("alerts"),
        "error should mention unknown field, got: {err_str}"
    );
}

// ============================================================================
// Diagnostic tests
// ============================================================================

/// Unknown key "chck_interval_secs" suggests "check_interval_secs".
#[test]
fn diagnostic_suggests_check_interval_secs() {
    let valid_keys = &[
        "check_interval_secs",
        "suppression_window_secs",
        "renotify_on_escalation",
        "default_reminder_days",
    ];
    let suggestion = suggest_key("chck_interval_secs", valid_keys);
    assert_eq!(suggestion, Some("check_interval_secs".to_string()));
}

/// Unknown key with no close match does NOT produce a suggestion.
#[test]
fn diagnostic_no_suggestion_for_distant_typo() {
    let valid_keys = &["max_visible", "auto_close_secs"];
    let suggestion = suggest_key("zzzzzz", valid_keys);
    assert!(suggestion.is_none(), "should not suggest for distant typo");
}

/// Error output from load_and_validate_str includes the unknown key name
/// and its fuzzy suggestion.
#[test]
fn diagnostic_error_includes_unknown_key() {
    let toml = r#"
[storage]
databse_path = "/tmp/x.db"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(!errors.is_empty(), "should have at least one error");

    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "databse_path"
                && suggestion.as_deref() == Some("database_path")
                && valid_keys.contains("database_path")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'databse_path' with suggestion, got: {errors:?}"
    );
}

/// Error output includes the list of valid keys for the section.
#[test]
fn diagnostic_error_includes_valid_keys() {
    let toml = r#"
[notifications]
max_visble = 2
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_valid_keys = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { valid_keys, .. } if {
            valid_keys.contains("max_visible") && valid_keys.contains("auto_close_secs")
        })
    });
    assert!(
        has_valid_keys,
        "error should list valid keys for [notifications] section"
    );
}

/// Invalid type (string where number expected) produces clear message.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[reminders]
check_interval_secs = "five minutes"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("check_interval_secs"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// ConfigError implements miette::Diagnostic (can be rendered).
#[test]
fn config_error_implements_diagnostic() {
    use miette::Diagnostic;

    let error = ConfigError::UnknownKey {
        key: "databse_path".to_string(),
        suggestion: Some("database_path".to_string()),
        valid_keys: "database_path, wal_mode".to_string(),
        span: None,
        src: None,
    };

    let code = error.code();
    assert!(code.is_some(), "should have diagnostic code");

    let help = error.help();
    assert!(help.is_some(), "should have help text");
    let help_str = help.unwrap().to_string();
    assert!(
        help_str.contains("did you mean `database_path`"),
        "help should contain suggestion, got: {help_str}"
    );
}

/// ConfigError can be rendered using miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "databse_path".to_string(),
        suggestion: Some("database_path".to_string()),
        valid_keys: "database_path, wal_mode".to_string(),
        span: None,
        src: None,
    };

    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(!buf.is_empty(), "rendered report should not be empty");
    assert!(buf.contains("databse_path"), "rendered report should mention the key");
}

/// load_and_validate_str with valid TOML returns Ok config.
#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[reminders]
check_interval_secs = 60
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.reminders.check_interval_secs, 60);
}

/// Validation catches a zero check interval.
#[test]
fn validation_catches_zero_interval() {
    let toml = r#"
[reminders]
check_interval_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero interval should fail");
    let has_validation_error = errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("check_interval_secs"))
    });
    assert!(has_validation_error, "should have validation error for zero interval");
}
