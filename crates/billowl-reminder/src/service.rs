// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The background reminder scheduler.
//!
//! [`ReminderService`] owns a worker task that wakes on a fixed interval,
//! classifies every unpaid bill, and pushes due reminders into an mpsc
//! channel for the notification manager to drain. `start` and `stop` are
//! idempotent; every error inside a tick is logged and survived.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use billowl_config::model::ReminderConfig;
use billowl_core::{
    Bill, BillId, BillStore, BillowlError, Clock, NotificationEvent, ServiceStatus,
    UpcomingReminder,
};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::evaluator;
use crate::ledger::ReminderLedger;

/// State shared between the service handle and its worker task.
struct TickState {
    config: ReminderConfig,
    store: Arc<dyn BillStore>,
    clock: Arc<dyn Clock>,
    ledger: Mutex<ReminderLedger>,
    reminders_sent: AtomicU64,
    last_check: Mutex<Option<DateTime<Utc>>>,
}

/// Periodic scheduler that turns unpaid bills into notification events.
///
/// The service owns its worker; dropping the service without `stop`
/// leaves the task running until the runtime shuts down, so long-lived
/// callers should stop it explicitly.
pub struct ReminderService {
    state: Arc<TickState>,
    worker: Mutex<Option<JoinHandle<()>>>,
    cancel: Mutex<Option<CancellationToken>>,
}

impl ReminderService {
    pub fn new(config: ReminderConfig, store: Arc<dyn BillStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(TickState {
                config,
                store,
                clock,
                ledger: Mutex::new(ReminderLedger::new()),
                reminders_sent: AtomicU64::new(0),
                last_check: Mutex::new(None),
            }),
            worker: Mutex::new(None),
            cancel: Mutex::new(None),
        }
    }

    /// Starts the worker, which ticks immediately and then on every
    /// interval. Calling `start` while a worker is alive is a no-op; a
    /// worker that has died is replaced.
    pub async fn start(&self, tx: mpsc::Sender<NotificationEvent>) {
        let mut worker = self.worker.lock().await;
        if let Some(handle) = worker.as_ref()
            && !handle.is_finished()
        {
            debug!("reminder service already running");
            return;
        }

        let token = CancellationToken::new();
        *self.cancel.lock().await = Some(token.clone());

        let state = self.state.clone();
        let handle = tokio::spawn(async move {
            run_worker(state, tx, token).await;
        });
        *worker = Some(handle);
        info!(
            interval_secs = self.state.config.check_interval_secs,
            "reminder service started"
        );
    }

    /// Stops the worker and waits for it to exit. Safe to call again
    /// after it returns, and safe to call without `start`.
    pub async fn stop(&self) {
        if let Some(token) = self.cancel.lock().await.take() {
            token.cancel();
        }
        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "reminder worker did not shut down cleanly");
            }
            info!("reminder service stopped");
        }
    }

    /// Quiets a bill until the given instant. The deadline overrides
    /// normal suppression: once it passes, the bill re-alerts on the next
    /// tick even if it was announced recently.
    pub async fn snooze(&self, bill_id: BillId, until: DateTime<Utc>) {
        self.state.ledger.lock().await.snooze_until(bill_id, until);
        debug!(bill_id, until = %until, "bill snoozed");
    }

    /// Forgets all ledger state for a bill. Called when a bill is paid so
    /// it never re-alerts, and so a later unpay starts fresh.
    pub async fn clear_bill(&self, bill_id: BillId) {
        self.state.ledger.lock().await.clear(bill_id);
        debug!(bill_id, "ledger state cleared");
    }

    /// Active snooze deadline for a bill, if any. Front ends use this to
    /// label a quieted prompt.
    pub async fn snoozed_until(&self, bill_id: BillId) -> Option<DateTime<Utc>> {
        self.state.ledger.lock().await.snoozed_until(bill_id)
    }

    /// Unpaid bills due within `days_ahead` days, overdue included,
    /// sorted soonest first with ties broken by bill id. Malformed rows
    /// are logged and skipped.
    pub async fn upcoming_reminders(
        &self,
        days_ahead: u32,
    ) -> Result<Vec<UpcomingReminder>, BillowlError> {
        let today = self.state.clock.today();
        let bills = self.state.store.fetch_unpaid_bills().await?;

        let mut upcoming = Vec::new();
        for bill in &bills {
            match evaluator::within_horizon(bill, today, days_ahead) {
                Ok(Some(reminder)) => upcoming.push(reminder),
                Ok(None) => {}
                Err(e) => warn!(bill_id = bill.id, error = %e, "skipping unreadable bill"),
            }
        }
        upcoming.sort_by(|a, b| {
            (a.days_until_due, a.bill.id).cmp(&(b.days_until_due, b.bill.id))
        });
        Ok(upcoming)
    }

    /// Point-in-time snapshot of the scheduler.
    pub async fn status(&self) -> ServiceStatus {
        let worker = self.worker.lock().await;
        let running = worker.is_some();
        let worker_alive = worker.as_ref().is_some_and(|h| !h.is_finished());
        drop(worker);

        ServiceStatus {
            running,
            check_interval_secs: self.state.config.check_interval_secs,
            last_check_at: *self.state.last_check.lock().await,
            reminders_sent: self.state.reminders_sent.load(Ordering::Relaxed),
            worker_alive,
        }
    }
}

async fn run_worker(
    state: Arc<TickState>,
    tx: mpsc::Sender<NotificationEvent>,
    cancel: CancellationToken,
) {
    let mut interval =
        tokio::time::interval(Duration::from_secs(state.config.check_interval_secs));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = run_tick(&state, &tx, &cancel).await {
                    warn!(error = %e, "reminder tick failed (non-fatal)");
                }
            }
            _ = cancel.cancelled() => {
                info!("reminder worker shutting down");
                break;
            }
        }
    }
}

/// One evaluation pass. A store failure aborts the whole pass; a bad
/// bill row is skipped; a closed channel drops the remaining sends.
async fn run_tick(
    state: &TickState,
    tx: &mpsc::Sender<NotificationEvent>,
    cancel: &CancellationToken,
) -> Result<(), BillowlError> {
    let now = state.clock.now();
    let today = state.clock.today();
    *state.last_check.lock().await = Some(now);

    let bills = state.store.fetch_unpaid_bills().await?;

    let live: HashSet<BillId> = bills.iter().map(|b| b.id).collect();
    state.ledger.lock().await.prune(&live);

    let due = collect_due(&bills, today);
    if due.is_empty() {
        debug!(unpaid = bills.len(), "tick complete, nothing due");
        return Ok(());
    }

    let window = chrono::Duration::seconds(state.config.suppression_window_secs as i64);
    for event in due {
        let bill_id = event.bill_id;
        let urgency = event.urgency;
        let allowed = {
            let ledger = state.ledger.lock().await;
            ledger.should_notify(
                bill_id,
                urgency,
                now,
                window,
                state.config.renotify_on_escalation,
            )
        };
        if !allowed {
            continue;
        }

        // The send must stay cancellable: a stopped manager means a full
        // channel, and stop() would otherwise wait on us forever.
        tokio::select! {
            sent = tx.send(event) => {
                if sent.is_err() {
                    warn!("notification channel closed, dropping remaining reminders");
                    return Ok(());
                }
                state.ledger.lock().await.record_sent(bill_id, urgency, now);
                state.reminders_sent.fetch_add(1, Ordering::Relaxed);
                debug!(bill_id, %urgency, "reminder dispatched");
            }
            _ = cancel.cancelled() => return Ok(()),
        }
    }

    Ok(())
}

/// Classifies bills and keeps the due ones, soonest first, ties by id.
fn collect_due(bills: &[Bill], today: chrono::NaiveDate) -> Vec<NotificationEvent> {
    let mut due = Vec::new();
    for bill in bills {
        match evaluator::build_event(bill, today) {
            Ok(Some(event)) => due.push(event),
            Ok(None) => {}
            Err(e) => warn!(bill_id = bill.id, error = %e, "skipping unreadable bill"),
        }
    }
    due.sort_by(|a, b| (a.days_until_due, a.bill_id).cmp(&(b.days_until_due, b.bill_id)));
    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use billowl_core::{BillingCycle, Urgency};

    fn make_bill(id: BillId, due_date: &str, reminder_days: u32) -> Bill {
        Bill {
            id,
            name: format!("Bill {id}"),
            amount: 10.0,
            due_date: due_date.to_string(),
            billing_cycle: BillingCycle::Monthly,
            reminder_days,
            paid: false,
            confirmation_number: None,
            category_id: None,
            payment_method_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn collect_due_sorts_by_days_then_id() {
        let today = "2026-03-10".parse().unwrap();
        let bills = vec![
            make_bill(5, "2026-03-12", 3),
            make_bill(2, "2026-03-08", 3),
            make_bill(9, "2026-03-12", 3),
            make_bill(1, "2026-04-01", 3),
        ];

        let due = collect_due(&bills, today);
        let order: Vec<BillId> = due.iter().map(|e| e.bill_id).collect();
        assert_eq!(order, vec![2, 5, 9]);
        assert_eq!(due[0].urgency, Urgency::Overdue);
    }

    #[test]
    fn collect_due_skips_unreadable_rows() {
        let today = "2026-03-10".parse().unwrap();
        let bills = vec![make_bill(1, "bogus", 3), make_bill(2, "2026-03-10", 3)];

        let due = collect_due(&bills, today);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].bill_id, 2);
    }
}
