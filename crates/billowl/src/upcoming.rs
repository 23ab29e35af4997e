// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `billowl upcoming` command implementation.
//!
//! Shows unpaid bills inside a look-ahead horizon, soonest first,
//! using the same evaluation the background scheduler runs.

use std::io::IsTerminal;
use std::sync::Arc;

use billowl_config::model::BillowlConfig;
use billowl_core::{BillStore, BillowlError, SystemClock, UpcomingReminder, Urgency};
use billowl_reminder::ReminderService;

use crate::bills::open_store;

pub async fn run_upcoming(
    config: &BillowlConfig,
    days: u32,
    json: bool,
    plain: bool,
) -> Result<(), BillowlError> {
    let store = Arc::new(open_store(config).await?);
    let service = ReminderService::new(
        config.reminders.clone(),
        store.clone(),
        Arc::new(SystemClock),
    );
    let upcoming = service.upcoming_reminders(days).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&upcoming).unwrap_or_else(|_| "[]".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_upcoming(&upcoming, days, use_color);
    }
    store.close().await
}

fn print_upcoming(upcoming: &[UpcomingReminder], days: u32, use_color: bool) {
    println!();
    println!("  billowl upcoming (next {days} days)");
    println!("  {}", "-".repeat(56));

    if upcoming.is_empty() {
        println!("  Nothing due. Enjoy it.");
        println!();
        return;
    }

    for reminder in upcoming {
        println!("{}", upcoming_line(reminder, use_color));
    }
    println!();
}

fn upcoming_line(reminder: &UpcomingReminder, use_color: bool) -> String {
    let marker = marker(reminder.urgency, use_color);
    let when = when_text(reminder.days_until_due, &reminder.bill.due_date);
    let when = if use_color {
        use colored::Colorize;
        match reminder.urgency {
            Urgency::Overdue => when.red().to_string(),
            Urgency::DueToday => when.yellow().to_string(),
            _ => when,
        }
    } else {
        when
    };

    format!(
        "  {marker} {:<22} {:>9}  {when}",
        reminder.bill.name,
        format!("${:.2}", reminder.bill.amount)
    )
}

fn marker(urgency: Urgency, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        match urgency {
            Urgency::Overdue => "✗".red().to_string(),
            Urgency::DueToday => "!".yellow().to_string(),
            Urgency::DueSoon => "•".cyan().to_string(),
            Urgency::NotDue => "·".to_string(),
        }
    } else {
        match urgency {
            Urgency::Overdue => "[OVERDUE]".to_string(),
            Urgency::DueToday => "[TODAY]  ".to_string(),
            Urgency::DueSoon => "[SOON]   ".to_string(),
            Urgency::NotDue => "[LATER]  ".to_string(),
        }
    }
}

fn when_text(days_until_due: i64, due_date: &str) -> String {
    match days_until_due {
        d if d < -1 => format!("{} days overdue (was due {due_date})", -d),
        -1 => format!("1 day overdue (was due {due_date})"),
        0 => "due today".to_string(),
        1 => "due tomorrow".to_string(),
        d => format!("due in {d} days ({due_date})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_text_covers_the_pivot_days() {
        assert_eq!(
            when_text(-3, "2026-03-07"),
            "3 days overdue (was due 2026-03-07)"
        );
        assert_eq!(
            when_text(-1, "2026-03-09"),
            "1 day overdue (was due 2026-03-09)"
        );
        assert_eq!(when_text(0, "2026-03-10"), "due today");
        assert_eq!(when_text(1, "2026-03-11"), "due tomorrow");
        assert_eq!(when_text(5, "2026-03-15"), "due in 5 days (2026-03-15)");
    }

    #[test]
    fn plain_markers_are_fixed_width() {
        for urgency in [
            Urgency::Overdue,
            Urgency::DueToday,
            Urgency::DueSoon,
            Urgency::NotDue,
        ] {
            assert_eq!(marker(urgency, false).len(), 9);
        }
    }
}
