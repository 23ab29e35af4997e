// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Billowl - a desktop bill reminder that nags until you pay.
//!
//! This is the binary entry point for the billowl CLI and the
//! foreground reminder daemon (`billowl serve`).

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

use billowl_core::StatusFilter;

mod bills;
mod doctor;
mod serve;
mod status;
mod upcoming;

/// Billowl - a desktop bill reminder that nags until you pay.
#[derive(Parser, Debug)]
#[command(name = "billowl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the reminder scheduler in the foreground.
    Serve,
    /// Add a bill.
    Add(bills::AddArgs),
    /// List bills, optionally filtered by payment status.
    List {
        /// Filter: all, paid, pending, or auto-pay.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Mark a bill paid.
    Pay {
        id: i64,
        /// Payment confirmation number to keep with the bill.
        confirmation: Option<String>,
    },
    /// Revert a bill to unpaid.
    Unpay { id: i64 },
    /// Advance a recurring bill to its next due date, unpaid again.
    Roll { id: i64 },
    /// Delete a bill.
    Remove { id: i64 },
    /// Show bills due within a horizon, overdue included.
    Upcoming {
        /// Days ahead to look.
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Emit JSON instead of a listing.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Show database health and bill counts.
    Status {
        /// Emit JSON for scripting.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Run diagnostic checks against the billowl environment.
    Doctor {
        /// Run additional intensive checks.
        #[arg(long)]
        deep: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Manage bill categories.
    #[command(subcommand)]
    Category(CategoryCommands),
    /// Manage payment methods.
    #[command(subcommand)]
    Payment(PaymentCommands),
}

#[derive(Subcommand, Debug)]
enum CategoryCommands {
    /// Add a category.
    Add { name: String },
    /// List categories.
    List,
}

#[derive(Subcommand, Debug)]
enum PaymentCommands {
    /// Add a payment method.
    Add {
        name: String,
        /// Bills on this method pay themselves; they are excluded from
        /// the pending filter but still remind.
        #[arg(long)]
        automatic: bool,
    },
    /// List payment methods.
    List,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match billowl_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            billowl_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Add(args)) => bills::run_add(&config, args).await,
        Some(Commands::List { status, json, plain }) => {
            bills::run_list(&config, status, json, plain).await
        }
        Some(Commands::Pay { id, confirmation }) => {
            bills::run_pay(&config, id, confirmation).await
        }
        Some(Commands::Unpay { id }) => bills::run_unpay(&config, id).await,
        Some(Commands::Roll { id }) => bills::run_roll(&config, id).await,
        Some(Commands::Remove { id }) => bills::run_remove(&config, id).await,
        Some(Commands::Upcoming { days, json, plain }) => {
            upcoming::run_upcoming(&config, days, json, plain).await
        }
        Some(Commands::Status { json, plain }) => {
            status::run_status(&config, json, plain).await
        }
        Some(Commands::Doctor { deep, plain }) => {
            doctor::run_doctor(&config, deep, plain).await
        }
        Some(Commands::Category(CategoryCommands::Add { name })) => {
            bills::run_category_add(&config, &name).await
        }
        Some(Commands::Category(CategoryCommands::List)) => {
            bills::run_category_list(&config).await
        }
        Some(Commands::Payment(PaymentCommands::Add { name, automatic })) => {
            bills::run_payment_add(&config, &name, automatic).await
        }
        Some(Commands::Payment(PaymentCommands::List)) => {
            bills::run_payment_list(&config).await
        }
        None => {
            println!("billowl: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("billowl: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_add_with_defaults() {
        let cli = Cli::parse_from(["billowl", "add", "Electric", "42.50", "2026-03-10"]);
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.name, "Electric");
                assert_eq!(args.amount, 42.50);
                assert_eq!(args.due_date, "2026-03-10");
                assert_eq!(args.cycle, billowl_core::BillingCycle::Monthly);
                assert!(args.reminder_days.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_list_filter() {
        let cli = Cli::parse_from(["billowl", "list", "--status", "auto-pay", "--json"]);
        match cli.command {
            Some(Commands::List { status, json, plain }) => {
                assert_eq!(status, StatusFilter::AutoPay);
                assert!(json);
                assert!(!plain);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_unknown_status_filter() {
        let parsed = Cli::try_parse_from(["billowl", "list", "--status", "autopay"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cli_parses_pay_with_optional_confirmation() {
        let cli = Cli::parse_from(["billowl", "pay", "3", "CONF-123"]);
        match cli.command {
            Some(Commands::Pay { id, confirmation }) => {
                assert_eq!(id, 3);
                assert_eq!(confirmation.as_deref(), Some("CONF-123"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::parse_from(["billowl", "pay", "3"]);
        match cli.command {
            Some(Commands::Pay { confirmation, .. }) => assert!(confirmation.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_payment_add_automatic() {
        let cli = Cli::parse_from(["billowl", "payment", "add", "Visa", "--automatic"]);
        match cli.command {
            Some(Commands::Payment(PaymentCommands::Add { name, automatic })) => {
                assert_eq!(name, "Visa");
                assert!(automatic);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
