// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the billowl workspace.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Row identifier for a bill.
pub type BillId = i64;

/// Health status reported by store health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Store is fully operational.
    Healthy,
    /// Store is operational but experiencing issues.
    Degraded(String),
    /// Store is not operational.
    Unhealthy(String),
}

/// How often a bill recurs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum BillingCycle {
    OneTime,
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

impl BillingCycle {
    /// The due date that follows `from` for this cycle, or `None` for
    /// one-time bills. Month-based cycles clamp to the last day of
    /// shorter months (Jan 31 + one month = Feb 28/29).
    pub fn next_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            BillingCycle::OneTime => None,
            BillingCycle::Weekly => from.checked_add_days(Days::new(7)),
            BillingCycle::BiWeekly => from.checked_add_days(Days::new(14)),
            BillingCycle::Monthly => from.checked_add_months(Months::new(1)),
            BillingCycle::Quarterly => from.checked_add_months(Months::new(3)),
            BillingCycle::SemiAnnually => from.checked_add_months(Months::new(6)),
            BillingCycle::Annually => from.checked_add_months(Months::new(12)),
        }
    }
}

/// Urgency bucket assigned to a bill by the reminder evaluator.
///
/// Variants are declared least to most urgent so an escalation check is a
/// plain `>` comparison.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    NotDue,
    DueSoon,
    DueToday,
    Overdue,
}

/// Payment-status filter for bill listings.
///
/// Unpaid bills split on their payment method: an `is_automatic` method
/// makes the bill `AutoPay`, anything else (including no method) is
/// `Pending`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    All,
    Paid,
    AutoPay,
    Pending,
}

/// A bill row as stored.
///
/// `due_date` is kept as raw `YYYY-MM-DD` text rather than a parsed date:
/// imported rows can carry malformed values, and classifying (or
/// rejecting) those is the evaluator's job, not the store's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub name: String,
    pub amount: f64,
    pub due_date: String,
    pub billing_cycle: BillingCycle,
    pub reminder_days: u32,
    pub paid: bool,
    pub confirmation_number: Option<String>,
    pub category_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields supplied when creating a bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBill {
    pub name: String,
    pub amount: f64,
    pub due_date: String,
    pub billing_cycle: BillingCycle,
    pub reminder_days: u32,
    pub category_id: Option<i64>,
    pub payment_method_id: Option<i64>,
}

/// Partial update for a bill; `None` fields are left untouched.
///
/// Payment state is changed through `mark_paid`/`mark_unpaid`, never here,
/// so a patch can never break the paid/confirmation invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillPatch {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<String>,
    pub billing_cycle: Option<BillingCycle>,
    pub reminder_days: Option<u32>,
    pub category_id: Option<i64>,
    pub payment_method_id: Option<i64>,
}

impl BillPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.due_date.is_none()
            && self.billing_cycle.is_none()
            && self.reminder_days.is_none()
            && self.category_id.is_none()
            && self.payment_method_id.is_none()
    }
}

/// A bill category (e.g. "Utilities", "Insurance").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// How a bill gets paid. `is_automatic` marks auto-pay methods, which
/// changes how unpaid bills are bucketed in status filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    pub is_automatic: bool,
}

/// One reminder emitted by the scheduler for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationEvent {
    pub bill_id: BillId,
    pub bill_name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    /// Whole days from "today" to the due date; negative once overdue.
    pub days_until_due: i64,
    pub urgency: Urgency,
    /// Pre-rendered prompt text; sinks display it verbatim.
    pub message: String,
}

/// A bill inside an `upcoming_reminders` horizon, with its classification.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingReminder {
    pub bill: Bill,
    pub days_until_due: i64,
    pub urgency: Urgency,
}

/// Snapshot of the reminder service, as returned by `status()`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub check_interval_secs: u64,
    pub last_check_at: Option<DateTime<Utc>>,
    /// Reminders sent since this service instance was constructed.
    pub reminders_sent: u64,
    /// False when the worker task exited without `stop()` being called.
    pub worker_alive: bool,
}
