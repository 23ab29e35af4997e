// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `billowl serve` command implementation.
//!
//! Wires the store, the reminder scheduler, and the notification
//! manager together and runs them in the foreground until SIGINT or
//! SIGTERM. Prompts render through the console sink; shutdown drains
//! the scheduler before the presentation loop so nothing is lost
//! mid-notification.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use billowl_config::model::BillowlConfig;
use billowl_core::{BillStore, BillowlError, HealthStatus, SystemClock};
use billowl_notify::{ConsoleSink, NotificationManager};
use billowl_reminder::ReminderService;
use billowl_store::SqliteBillStore;

/// Runs the `billowl serve` command.
///
/// Opens the database, starts the reminder scheduler and the prompt
/// manager, and blocks until a shutdown signal arrives.
pub async fn run_serve(config: BillowlConfig) -> Result<(), BillowlError> {
    // Initialize tracing subscriber.
    init_tracing(&config.app.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting billowl serve");

    // Initialize storage.
    let store = Arc::new(SqliteBillStore::open(&config.storage).await?);
    match store.health_check().await? {
        HealthStatus::Healthy => {
            info!(path = %config.storage.database_path, "database ready");
        }
        HealthStatus::Degraded(reason) => {
            warn!(%reason, "database degraded, continuing");
        }
        HealthStatus::Unhealthy(reason) => {
            return Err(BillowlError::Store {
                source: reason.into(),
            });
        }
    }

    // Build the scheduler and the prompt manager around a shared channel.
    let clock = Arc::new(SystemClock);
    let service = Arc::new(ReminderService::new(
        config.reminders.clone(),
        store.clone(),
        clock.clone(),
    ));
    let sink = Arc::new(ConsoleSink::new());
    let manager = Arc::new(NotificationManager::new(
        config.notifications.clone(),
        store.clone(),
        service.clone(),
        sink,
        clock,
    ));

    let (tx, rx) = mpsc::channel(64);
    manager.start(rx).await;
    service.start(tx).await;
    info!(
        interval_secs = config.reminders.check_interval_secs,
        suppression_secs = config.reminders.suppression_window_secs,
        max_visible = config.notifications.max_visible,
        "reminder scheduler running"
    );

    // Install signal handler.
    let cancel = install_signal_handler();

    // Spawn memory monitor background task.
    let mem_handle = tokio::spawn(memory_monitor(cancel.clone()));

    cancel.cancelled().await;
    info!("shutdown signal received, draining");

    // Scheduler first so no new events race the closing prompt panel.
    service.stop().await;
    manager.stop().await;
    if let Err(e) = mem_handle.await {
        warn!(error = %e, "memory monitor ended abnormally");
    }
    store.close().await?;

    info!("billowl serve shutdown complete");
    Ok(())
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal
/// is received.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Background task that logs memory usage via jemalloc stats and
/// /proc/self/statm (Linux) once a minute.
#[cfg(not(target_env = "msvc"))]
async fn memory_monitor(cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Read jemalloc stats (requires epoch advance for fresh data).
                let _ = tikv_jemalloc_ctl::epoch::advance();
                let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
                let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
                let rss = read_rss_bytes().unwrap_or(0);

                debug!(
                    heap_mb = allocated / (1024 * 1024),
                    resident_mb = resident / (1024 * 1024),
                    rss_mb = rss / (1024 * 1024),
                    "memory usage"
                );
            }
            _ = cancel.cancelled() => {
                info!("memory monitor shutting down");
                break;
            }
        }
    }
}

/// Stub memory monitor for MSVC (no jemalloc).
#[cfg(target_env = "msvc")]
async fn memory_monitor(cancel: CancellationToken) {
    cancel.cancelled().await;
}

/// Read the process RSS in bytes from /proc/self/statm (Linux only).
///
/// Returns None on non-Linux platforms or if the file cannot be read.
#[cfg(not(target_env = "msvc"))]
fn read_rss_bytes() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
        let rss_pages = statm.split_whitespace().nth(1)?.parse::<u64>().ok()?;
        Some(rss_pages * 4096)
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    // Every workspace crate logs under a billowl_* target; third-party
    // crates stay at warn unless RUST_LOG overrides the whole filter.
    let directives = [
        "billowl",
        "billowl_config",
        "billowl_store",
        "billowl_reminder",
        "billowl_notify",
    ]
    .map(|target| format!("{target}={log_level}"))
    .join(",");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{directives},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
