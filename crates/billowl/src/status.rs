// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `billowl status` command implementation.
//!
//! Reports database health and bill counts by urgency so a glance
//! answers "is anything about to bite me". Falls back to a failure
//! report when the database cannot be opened.

use std::io::IsTerminal;

use serde::Serialize;

use billowl_config::model::BillowlConfig;
use billowl_core::{BillStore, BillowlError, Clock, HealthStatus, StatusFilter, SystemClock, Urgency};
use billowl_reminder::classify;

use crate::bills::open_store;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub database_path: String,
    pub database_healthy: bool,
    pub total_bills: usize,
    pub unpaid_bills: usize,
    pub overdue: usize,
    pub due_today: usize,
    pub due_soon: usize,
    pub unreadable_due_dates: usize,
    pub check_interval_secs: u64,
    pub suppression_window_secs: u64,
}

pub async fn run_status(
    config: &BillowlConfig,
    json: bool,
    plain: bool,
) -> Result<(), BillowlError> {
    let store = open_store(config).await?;
    let healthy = matches!(store.health_check().await?, HealthStatus::Healthy);

    let total_bills = store.list_bills(StatusFilter::All).await?.len();
    let unpaid = store.fetch_unpaid_bills().await?;

    let today = SystemClock.today();
    let mut overdue = 0;
    let mut due_today = 0;
    let mut due_soon = 0;
    let mut unreadable = 0;
    for bill in &unpaid {
        match classify(bill, today) {
            Ok(eval) => match eval.urgency {
                Urgency::Overdue => overdue += 1,
                Urgency::DueToday => due_today += 1,
                Urgency::DueSoon => due_soon += 1,
                Urgency::NotDue => {}
            },
            Err(_) => unreadable += 1,
        }
    }

    let report = StatusReport {
        database_path: config.storage.database_path.clone(),
        database_healthy: healthy,
        total_bills,
        unpaid_bills: unpaid.len(),
        overdue,
        due_today,
        due_soon,
        unreadable_due_dates: unreadable,
        check_interval_secs: config.reminders.check_interval_secs,
        suppression_window_secs: config.reminders.suppression_window_secs,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&report, use_color);
    }
    store.close().await
}

fn print_status(report: &StatusReport, use_color: bool) {
    println!();
    println!("  billowl status");
    println!("  {}", "-".repeat(45));

    if use_color {
        use colored::Colorize;
        let db = if report.database_healthy {
            format!("{} healthy", "✓".green())
        } else {
            format!("{} unhealthy", "✗".red())
        };
        println!("    Database: {db} ({})", report.database_path);
    } else {
        let db = if report.database_healthy {
            "[OK] healthy"
        } else {
            "[FAIL] unhealthy"
        };
        println!("    Database: {db} ({})", report.database_path);
    }

    println!(
        "    Bills:    {} total, {} unpaid",
        report.total_bills, report.unpaid_bills
    );
    println!(
        "    Due:      {} overdue, {} due today, {} due soon",
        report.overdue, report.due_today, report.due_soon
    );
    if report.unreadable_due_dates > 0 {
        println!(
            "    Warning:  {} bill(s) with unreadable due dates (run: billowl doctor)",
            report.unreadable_due_dates
        );
    }
    println!(
        "    Schedule: check every {}s, quiet window {}s",
        report.check_interval_secs, report.suppression_window_secs
    );
    println!();
}
