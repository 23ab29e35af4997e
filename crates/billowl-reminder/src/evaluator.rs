// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure due-date evaluation.
//!
//! Everything here is a function of a bill and a date. No clocks, no
//! storage, no channels; the scheduler supplies "today" and acts on the
//! results.

use billowl_core::{Bill, BillowlError, NotificationEvent, UpcomingReminder, Urgency};
use chrono::NaiveDate;

/// Outcome of classifying one bill against a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub due_date: NaiveDate,
    /// Whole days from the reference date to the due date; negative once
    /// overdue.
    pub days_until_due: i64,
    pub urgency: Urgency,
}

/// Parses a bill's stored due date, mapping failures to a `Data` error
/// that names the bill.
pub fn parse_due_date(bill: &Bill) -> Result<NaiveDate, BillowlError> {
    NaiveDate::parse_from_str(&bill.due_date, "%Y-%m-%d").map_err(|e| BillowlError::Data {
        bill_id: Some(bill.id),
        message: format!("malformed due date {:?}: {e}", bill.due_date),
    })
}

/// Classifies a bill against `today`.
///
/// A paid bill is always `NotDue`, whatever its date. Unpaid bills bucket
/// on the signed day difference: negative is `Overdue`, zero is
/// `DueToday`, within the bill's `reminder_days` is `DueSoon`, and
/// anything further out is `NotDue`. A bill with `reminder_days` of zero
/// gets no advance warning but still turns `DueToday` on the day itself.
pub fn classify(bill: &Bill, today: NaiveDate) -> Result<Evaluation, BillowlError> {
    let due_date = parse_due_date(bill)?;
    let days_until_due = (due_date - today).num_days();

    let urgency = if bill.paid {
        Urgency::NotDue
    } else if days_until_due < 0 {
        Urgency::Overdue
    } else if days_until_due == 0 {
        Urgency::DueToday
    } else if days_until_due <= i64::from(bill.reminder_days) {
        Urgency::DueSoon
    } else {
        Urgency::NotDue
    };

    Ok(Evaluation {
        due_date,
        days_until_due,
        urgency,
    })
}

/// Renders the prompt text for a reminder.
pub fn reminder_message(name: &str, amount: f64, days_until_due: i64, urgency: Urgency) -> String {
    match urgency {
        Urgency::Overdue => {
            let late = -days_until_due;
            format!("{name} is {} overdue (${amount:.2})", day_word(late))
        }
        Urgency::DueToday => format!("{name} is due today (${amount:.2})"),
        Urgency::DueSoon if days_until_due == 1 => {
            format!("{name} is due tomorrow (${amount:.2})")
        }
        Urgency::DueSoon => {
            format!("{name} is due in {} (${amount:.2})", day_word(days_until_due))
        }
        Urgency::NotDue => format!("{name} is not due yet (${amount:.2})"),
    }
}

fn day_word(n: i64) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{n} days")
    }
}

/// Builds the notification event for a bill, or `None` when nothing is
/// due. Malformed rows surface as `Data` errors for the caller to skip.
pub fn build_event(bill: &Bill, today: NaiveDate) -> Result<Option<NotificationEvent>, BillowlError> {
    let eval = classify(bill, today)?;
    if eval.urgency == Urgency::NotDue {
        return Ok(None);
    }
    Ok(Some(NotificationEvent {
        bill_id: bill.id,
        bill_name: bill.name.clone(),
        amount: bill.amount,
        due_date: eval.due_date,
        days_until_due: eval.days_until_due,
        urgency: eval.urgency,
        message: reminder_message(&bill.name, bill.amount, eval.days_until_due, eval.urgency),
    }))
}

/// Evaluates a bill against a lookahead horizon instead of its own
/// `reminder_days`. Overdue bills always fall inside the horizon; paid
/// bills never do.
pub fn within_horizon(
    bill: &Bill,
    today: NaiveDate,
    days_ahead: u32,
) -> Result<Option<UpcomingReminder>, BillowlError> {
    let eval = classify(bill, today)?;
    if bill.paid || eval.days_until_due > i64::from(days_ahead) {
        return Ok(None);
    }
    Ok(Some(UpcomingReminder {
        bill: bill.clone(),
        days_until_due: eval.days_until_due,
        urgency: eval.urgency,
    }))
}
