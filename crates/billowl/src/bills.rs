// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bill management commands: add, list, pay, unpay, roll, remove, plus
//! the category and payment-method lookups.
//!
//! Every command opens the store, does its work, and checkpoints the
//! database on the way out. Validation that does not need the database
//! (date format, negative amounts) happens before the store is touched.

use std::io::IsTerminal;

use chrono::NaiveDate;

use billowl_config::model::BillowlConfig;
use billowl_core::{Bill, BillStore, BillowlError, NewBill, StatusFilter};
use billowl_store::SqliteBillStore;

pub(crate) async fn open_store(config: &BillowlConfig) -> Result<SqliteBillStore, BillowlError> {
    SqliteBillStore::open(&config.storage).await
}

/// Arguments for `billowl add`.
#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Bill name, e.g. "Electric".
    pub name: String,
    /// Amount due.
    pub amount: f64,
    /// Due date in YYYY-MM-DD form.
    pub due_date: String,
    /// Billing cycle: one-time, weekly, bi-weekly, monthly, quarterly,
    /// semi-annually, or annually.
    #[arg(long, default_value = "monthly")]
    pub cycle: billowl_core::BillingCycle,
    /// Days of advance notice; defaults to `reminders.default_reminder_days`.
    #[arg(long)]
    pub reminder_days: Option<u32>,
    /// Category name, created on first use.
    #[arg(long)]
    pub category: Option<String>,
    /// Payment method name; must already exist (`billowl payment add`).
    #[arg(long)]
    pub payment_method: Option<String>,
}

pub async fn run_add(config: &BillowlConfig, args: AddArgs) -> Result<(), BillowlError> {
    NaiveDate::parse_from_str(&args.due_date, "%Y-%m-%d").map_err(|e| BillowlError::Data {
        bill_id: None,
        message: format!("invalid due date {:?} (expected YYYY-MM-DD): {e}", args.due_date),
    })?;
    if args.amount < 0.0 {
        return Err(BillowlError::Data {
            bill_id: None,
            message: format!("amount cannot be negative: {}", args.amount),
        });
    }

    let store = open_store(config).await?;

    let category_id = match &args.category {
        Some(name) => Some(resolve_category(&store, name).await?),
        None => None,
    };
    let payment_method_id = match &args.payment_method {
        Some(name) => Some(resolve_payment_method(&store, name).await?),
        None => None,
    };

    let new_bill = NewBill {
        name: args.name.clone(),
        amount: args.amount,
        due_date: args.due_date.clone(),
        billing_cycle: args.cycle,
        reminder_days: args
            .reminder_days
            .unwrap_or(config.reminders.default_reminder_days),
        category_id,
        payment_method_id,
    };
    let id = store.insert_bill(&new_bill).await?;
    println!(
        "Added bill {id}: {} ${:.2} due {} ({})",
        args.name, args.amount, args.due_date, args.cycle
    );
    store.close().await
}

/// Find a category by name, creating it on first use.
async fn resolve_category(store: &SqliteBillStore, name: &str) -> Result<i64, BillowlError> {
    if let Some(existing) = store
        .list_categories()
        .await?
        .into_iter()
        .find(|c| c.name == name)
    {
        return Ok(existing.id);
    }
    let id = store.insert_category(name).await?;
    println!("Created category {id}: {name}");
    Ok(id)
}

/// Find a payment method by name. Unlike categories these are never
/// auto-created: the auto-pay flag has to be chosen explicitly.
async fn resolve_payment_method(
    store: &SqliteBillStore,
    name: &str,
) -> Result<i64, BillowlError> {
    store
        .list_payment_methods()
        .await?
        .into_iter()
        .find(|m| m.name == name)
        .map(|m| m.id)
        .ok_or_else(|| BillowlError::Data {
            bill_id: None,
            message: format!(
                "unknown payment method {name:?}; add it first with: billowl payment add"
            ),
        })
}

pub async fn run_list(
    config: &BillowlConfig,
    status: StatusFilter,
    json: bool,
    plain: bool,
) -> Result<(), BillowlError> {
    let store = open_store(config).await?;
    let bills = store.list_bills(status).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&bills).unwrap_or_else(|_| "[]".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_bill_table(&bills, use_color);
    }
    store.close().await
}

fn print_bill_table(bills: &[Bill], use_color: bool) {
    println!();
    println!("  billowl bills ({})", bills.len());
    println!("  {}", "-".repeat(64));

    if bills.is_empty() {
        println!("  No bills yet. Add one with: billowl add <name> <amount> <due-date>");
        println!();
        return;
    }

    println!(
        "  {:<4} {:<12} {:<22} {:>9}  {:<14} {}",
        "ID", "Due", "Bill", "Amount", "Cycle", "Status"
    );
    for bill in bills {
        println!("{}", bill_row(bill, use_color));
    }
    println!();
}

fn bill_row(bill: &Bill, use_color: bool) -> String {
    let status = if bill.paid {
        match &bill.confirmation_number {
            Some(conf) => format!("paid (#{conf})"),
            None => "paid".to_string(),
        }
    } else {
        "unpaid".to_string()
    };
    let status = if use_color {
        use colored::Colorize;
        if bill.paid {
            status.green().to_string()
        } else {
            status.yellow().to_string()
        }
    } else {
        status
    };

    format!(
        "  {:<4} {:<12} {:<22} {:>9}  {:<14} {}",
        bill.id,
        bill.due_date,
        bill.name,
        format!("${:.2}", bill.amount),
        bill.billing_cycle.to_string(),
        status
    )
}

pub async fn run_pay(
    config: &BillowlConfig,
    id: i64,
    confirmation: Option<String>,
) -> Result<(), BillowlError> {
    let store = open_store(config).await?;
    store.mark_paid(id, confirmation.as_deref()).await?;
    match confirmation {
        Some(conf) => println!("Bill {id} marked paid (confirmation {conf})"),
        None => println!("Bill {id} marked paid"),
    }
    store.close().await
}

pub async fn run_unpay(config: &BillowlConfig, id: i64) -> Result<(), BillowlError> {
    let store = open_store(config).await?;
    store.mark_unpaid(id).await?;
    println!("Bill {id} reverted to unpaid");
    store.close().await
}

/// Advance a recurring bill: next due date from its cycle, paid flag and
/// confirmation cleared. One-time bills do not roll.
pub async fn run_roll(config: &BillowlConfig, id: i64) -> Result<(), BillowlError> {
    let store = open_store(config).await?;
    let bill = store
        .get_bill(id)
        .await?
        .ok_or(BillowlError::BillNotFound { id })?;

    let due = NaiveDate::parse_from_str(&bill.due_date, "%Y-%m-%d").map_err(|e| {
        BillowlError::Data {
            bill_id: Some(id),
            message: format!("malformed due date {:?}: {e}", bill.due_date),
        }
    })?;
    let next = bill.billing_cycle.next_date(due).ok_or_else(|| BillowlError::Data {
        bill_id: Some(id),
        message: format!("{} bills do not recur", bill.billing_cycle),
    })?;

    let next_str = next.format("%Y-%m-%d").to_string();
    store.begin_next_cycle(id, &next_str).await?;
    println!(
        "Bill {id} ({}) rolled forward: due {next_str}, unpaid",
        bill.name
    );
    store.close().await
}

pub async fn run_remove(config: &BillowlConfig, id: i64) -> Result<(), BillowlError> {
    let store = open_store(config).await?;
    store.delete_bill(id).await?;
    println!("Bill {id} removed");
    store.close().await
}

pub async fn run_category_add(config: &BillowlConfig, name: &str) -> Result<(), BillowlError> {
    let store = open_store(config).await?;
    let id = store.insert_category(name).await?;
    println!("Added category {id}: {name}");
    store.close().await
}

pub async fn run_category_list(config: &BillowlConfig) -> Result<(), BillowlError> {
    let store = open_store(config).await?;
    let categories = store.list_categories().await?;
    println!();
    println!("  billowl categories ({})", categories.len());
    println!("  {}", "-".repeat(35));
    for category in &categories {
        println!("  {:<4} {}", category.id, category.name);
    }
    println!();
    store.close().await
}

pub async fn run_payment_add(
    config: &BillowlConfig,
    name: &str,
    automatic: bool,
) -> Result<(), BillowlError> {
    let store = open_store(config).await?;
    let id = store.insert_payment_method(name, automatic).await?;
    let kind = if automatic { "auto-pay" } else { "manual" };
    println!("Added payment method {id}: {name} ({kind})");
    store.close().await
}

pub async fn run_payment_list(config: &BillowlConfig) -> Result<(), BillowlError> {
    let store = open_store(config).await?;
    let methods = store.list_payment_methods().await?;
    println!();
    println!("  billowl payment methods ({})", methods.len());
    println!("  {}", "-".repeat(35));
    for method in &methods {
        let kind = if method.is_automatic { "auto-pay" } else { "manual" };
        println!("  {:<4} {:<22} {kind}", method.id, method.name);
    }
    println!();
    store.close().await
}

#[cfg(test)]
mod tests {
    use billowl_core::BillingCycle;

    use super::*;

    fn sample_bill(paid: bool, confirmation: Option<&str>) -> Bill {
        Bill {
            id: 3,
            name: "Electric".to_string(),
            amount: 42.5,
            due_date: "2026-03-10".to_string(),
            billing_cycle: BillingCycle::Monthly,
            reminder_days: 3,
            paid,
            confirmation_number: confirmation.map(str::to_string),
            category_id: None,
            payment_method_id: None,
            created_at: "2026-03-01T00:00:00Z".to_string(),
            updated_at: "2026-03-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn bill_row_plain_unpaid() {
        let row = bill_row(&sample_bill(false, None), false);
        assert!(row.contains("Electric"));
        assert!(row.contains("$42.50"));
        assert!(row.contains("monthly"));
        assert!(row.trim_end().ends_with("unpaid"));
    }

    #[test]
    fn bill_row_shows_confirmation() {
        let row = bill_row(&sample_bill(true, Some("CONF-99")), false);
        assert!(row.contains("paid (#CONF-99)"));
    }

    #[tokio::test]
    async fn add_rejects_bad_date_before_opening_store() {
        let config = BillowlConfig::default();
        let args = AddArgs {
            name: "Electric".to_string(),
            amount: 42.5,
            due_date: "03/10/2026".to_string(),
            cycle: BillingCycle::Monthly,
            reminder_days: None,
            category: None,
            payment_method: None,
        };
        let err = run_add(&config, args).await.unwrap_err();
        assert!(matches!(err, BillowlError::Data { bill_id: None, .. }));
    }

    #[tokio::test]
    async fn add_rejects_negative_amount() {
        let config = BillowlConfig::default();
        let args = AddArgs {
            name: "Electric".to_string(),
            amount: -5.0,
            due_date: "2026-03-10".to_string(),
            cycle: BillingCycle::Monthly,
            reminder_days: None,
            category: None,
            payment_method: None,
        };
        let err = run_add(&config, args).await.unwrap_err();
        assert!(matches!(err, BillowlError::Data { .. }));
    }
}
