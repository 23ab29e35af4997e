// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Visible-prompt manager between the reminder scheduler and a sink.
//!
//! The manager drains the scheduler's notification channel and decides
//! what is on screen: at most `max_visible` prompts at a time, the rest
//! queued in arrival order until a slot frees up. User actions routed
//! through here (`mark_paid`, `snooze`, `dismiss`) update the store and
//! the scheduler's ledger; the manager itself never evaluates due dates.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use billowl_config::model::NotificationsConfig;
use billowl_core::{
    BillId, BillStore, BillowlError, Clock, NotificationEvent, NotificationSink,
};
use billowl_reminder::ReminderService;

/// A prompt currently on screen.
struct VisiblePrompt {
    event: NotificationEvent,
    /// When the prompt auto-closes; `None` keeps it open until acted on.
    closes_at: Option<Instant>,
}

/// Everything the prompt panel knows: what is visible and what waits.
#[derive(Default)]
struct Panel {
    visible: Vec<VisiblePrompt>,
    overflow: VecDeque<NotificationEvent>,
}

impl Panel {
    fn position_of(&self, bill_id: BillId) -> Option<usize> {
        self.visible.iter().position(|p| p.event.bill_id == bill_id)
    }

    /// Earliest auto-close deadline among visible prompts.
    fn next_deadline(&self) -> Option<Instant> {
        self.visible.iter().filter_map(|p| p.closes_at).min()
    }

    /// Queue an event behind the visible prompts. A newer event for the
    /// same bill replaces the queued one instead of stacking up.
    fn enqueue_overflow(&mut self, event: NotificationEvent) {
        if let Some(slot) = self
            .overflow
            .iter_mut()
            .find(|e| e.bill_id == event.bill_id)
        {
            *slot = event;
        } else {
            self.overflow.push_back(event);
        }
    }
}

struct PanelState {
    config: NotificationsConfig,
    store: Arc<dyn BillStore>,
    service: Arc<ReminderService>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    panel: Mutex<Panel>,
}

impl PanelState {
    fn fresh_deadline(&self) -> Option<Instant> {
        self.config
            .auto_close_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs))
    }

    async fn present(&self, event: &NotificationEvent) {
        if let Err(e) = self.sink.present(event).await {
            warn!(
                bill_id = event.bill_id,
                error = %e,
                "failed to present reminder (non-fatal)"
            );
        }
    }

    async fn dismiss(&self, bill_id: BillId) {
        if let Err(e) = self.sink.dismiss(bill_id).await {
            warn!(bill_id, error = %e, "failed to dismiss prompt (non-fatal)");
        }
    }

    /// Route one scheduler event onto the panel.
    ///
    /// A bill that is already visible gets its prompt refreshed in place,
    /// so an escalation re-alert updates the text rather than opening a
    /// second prompt for the same bill.
    async fn show(&self, event: NotificationEvent) {
        let mut panel = self.panel.lock().await;
        if let Some(idx) = panel.position_of(event.bill_id) {
            panel.visible[idx].event = event.clone();
            panel.visible[idx].closes_at = self.fresh_deadline();
            self.present(&event).await;
        } else if panel.visible.len() < self.config.max_visible {
            panel.visible.push(VisiblePrompt {
                event: event.clone(),
                closes_at: self.fresh_deadline(),
            });
            self.present(&event).await;
        } else {
            debug!(
                bill_id = event.bill_id,
                queued = panel.overflow.len() + 1,
                "prompt slots full, queueing reminder"
            );
            panel.enqueue_overflow(event);
        }
    }

    /// Fill freed slots from the overflow queue, oldest first.
    async fn promote(&self, panel: &mut Panel) {
        while panel.visible.len() < self.config.max_visible {
            let Some(event) = panel.overflow.pop_front() else {
                break;
            };
            panel.visible.push(VisiblePrompt {
                event: event.clone(),
                closes_at: self.fresh_deadline(),
            });
            self.present(&event).await;
        }
    }

    /// Close every prompt whose auto-close deadline has passed.
    async fn expire(&self) {
        let now = Instant::now();
        let mut panel = self.panel.lock().await;
        let mut closed = Vec::new();
        panel.visible.retain(|p| {
            if p.closes_at.is_some_and(|at| at <= now) {
                closed.push(p.event.bill_id);
                false
            } else {
                true
            }
        });
        for bill_id in closed {
            debug!(bill_id, "prompt auto-closed");
            self.dismiss(bill_id).await;
        }
        self.promote(&mut panel).await;
    }

    /// Drop a bill's prompt wherever it is. Only prompts that actually
    /// reached the screen get a sink dismissal.
    async fn remove(&self, bill_id: BillId) {
        let mut panel = self.panel.lock().await;
        if let Some(idx) = panel.position_of(bill_id) {
            panel.visible.remove(idx);
            self.dismiss(bill_id).await;
            self.promote(&mut panel).await;
        } else {
            panel.overflow.retain(|e| e.bill_id != bill_id);
        }
    }

    async fn close_all(&self) {
        let mut panel = self.panel.lock().await;
        for prompt in panel.visible.drain(..) {
            self.dismiss(prompt.event.bill_id).await;
        }
        panel.overflow.clear();
    }
}

/// Owns the presentation loop.
///
/// `start` hands the manager the receiving end of the scheduler's
/// channel; the spawned worker then serializes every panel mutation,
/// so prompts, promotions, and auto-closes never race each other.
pub struct NotificationManager {
    state: Arc<PanelState>,
    worker: Mutex<Option<JoinHandle<()>>>,
    cancel: Mutex<Option<CancellationToken>>,
}

impl NotificationManager {
    pub fn new(
        config: NotificationsConfig,
        store: Arc<dyn BillStore>,
        service: Arc<ReminderService>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: Arc::new(PanelState {
                config,
                store,
                service,
                sink,
                clock,
                panel: Mutex::new(Panel::default()),
            }),
            worker: Mutex::new(None),
            cancel: Mutex::new(None),
        }
    }

    /// Spawn the presentation loop over `rx`. A second call while the
    /// loop is alive is a no-op and drops the new receiver.
    pub async fn start(&self, rx: mpsc::Receiver<NotificationEvent>) {
        let mut worker = self.worker.lock().await;
        if let Some(handle) = worker.as_ref()
            && !handle.is_finished()
        {
            debug!("presentation loop already running, ignoring start");
            return;
        }

        let cancel = CancellationToken::new();
        *self.cancel.lock().await = Some(cancel.clone());

        let state = self.state.clone();
        *worker = Some(tokio::spawn(run_worker(state, rx, cancel)));
        info!(
            max_visible = self.state.config.max_visible,
            auto_close_secs = ?self.state.config.auto_close_secs,
            "notification manager started"
        );
    }

    /// Stop the loop and dismiss everything on screen. Safe to call
    /// repeatedly or without a prior `start`.
    pub async fn stop(&self) {
        if let Some(cancel) = self.cancel.lock().await.take() {
            cancel.cancel();
        }
        if let Some(handle) = self.worker.lock().await.take()
            && let Err(e) = handle.await
        {
            warn!(error = %e, "presentation worker ended abnormally");
        }
    }

    /// Settle a bill straight from its prompt: persist the paid flag,
    /// clear the scheduler's ledger entry, close the prompt.
    ///
    /// The store write comes first; if it fails the ledger and the
    /// prompt stay untouched so the reminder keeps firing.
    pub async fn mark_paid(&self, bill_id: BillId) -> Result<(), BillowlError> {
        self.state.store.mark_paid(bill_id, None).await?;
        self.state.service.clear_bill(bill_id).await;
        self.state.remove(bill_id).await;
        info!(bill_id, "bill marked paid from prompt");
        Ok(())
    }

    /// Quiet a bill for `for_duration` without touching its paid state.
    pub async fn snooze(&self, bill_id: BillId, for_duration: chrono::Duration) {
        let until = self.state.clock.now() + for_duration;
        self.state.service.snooze(bill_id, until).await;
        self.state.remove(bill_id).await;
        info!(bill_id, until = %until, "reminder snoozed from prompt");
    }

    /// Close a prompt without recording anything. The scheduler's
    /// suppression window still governs when the bill fires again.
    pub async fn dismiss(&self, bill_id: BillId) {
        self.state.remove(bill_id).await;
    }

    /// Present one event directly, bypassing the scheduler channel.
    /// Subject to the same cap and overflow rules as channel deliveries.
    pub async fn show_notification(&self, event: NotificationEvent) {
        self.state.show(event).await;
    }

    /// Dismiss everything on screen and drop the overflow queue.
    pub async fn close_all(&self) {
        self.state.close_all().await;
    }

    /// Snapshot of the prompts currently on screen, oldest first.
    pub async fn visible(&self) -> Vec<NotificationEvent> {
        let panel = self.state.panel.lock().await;
        panel.visible.iter().map(|p| p.event.clone()).collect()
    }

    /// Number of reminders waiting for a free prompt slot.
    pub async fn queued_count(&self) -> usize {
        self.state.panel.lock().await.overflow.len()
    }
}

async fn run_worker(
    state: Arc<PanelState>,
    mut rx: mpsc::Receiver<NotificationEvent>,
    cancel: CancellationToken,
) {
    loop {
        let deadline = state.panel.lock().await.next_deadline();
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = rx.recv() => match received {
                Some(event) => state.show(event).await,
                None => {
                    debug!("scheduler channel closed, ending presentation loop");
                    break;
                }
            },
            _ = sleep_until_opt(deadline) => state.expire().await,
        }
    }
    state.close_all().await;
    debug!("presentation loop stopped");
}

/// Sleep until `deadline`, or forever when no prompt auto-closes.
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use billowl_core::Urgency;

    use super::*;

    fn event(bill_id: BillId, name: &str) -> NotificationEvent {
        NotificationEvent {
            bill_id,
            bill_name: name.to_string(),
            amount: 25.0,
            due_date: "2026-03-12".parse().unwrap(),
            days_until_due: 2,
            urgency: Urgency::DueSoon,
            message: format!("{name} is due in 2 days ($25.00)"),
        }
    }

    #[test]
    fn next_deadline_picks_earliest() {
        let now = Instant::now();
        let panel = Panel {
            visible: vec![
                VisiblePrompt {
                    event: event(1, "A"),
                    closes_at: Some(now + Duration::from_secs(30)),
                },
                VisiblePrompt {
                    event: event(2, "B"),
                    closes_at: None,
                },
                VisiblePrompt {
                    event: event(3, "C"),
                    closes_at: Some(now + Duration::from_secs(10)),
                },
            ],
            overflow: VecDeque::new(),
        };
        assert_eq!(panel.next_deadline(), Some(now + Duration::from_secs(10)));
    }

    #[test]
    fn next_deadline_none_without_auto_close() {
        let panel = Panel {
            visible: vec![VisiblePrompt {
                event: event(1, "A"),
                closes_at: None,
            }],
            overflow: VecDeque::new(),
        };
        assert_eq!(panel.next_deadline(), None);
        assert_eq!(Panel::default().next_deadline(), None);
    }

    #[test]
    fn enqueue_overflow_replaces_same_bill() {
        let mut panel = Panel::default();
        panel.enqueue_overflow(event(1, "A"));
        panel.enqueue_overflow(event(2, "B"));
        let mut updated = event(1, "A");
        updated.urgency = Urgency::DueToday;
        panel.enqueue_overflow(updated);

        assert_eq!(panel.overflow.len(), 2);
        assert_eq!(panel.overflow[0].bill_id, 1);
        assert_eq!(panel.overflow[0].urgency, Urgency::DueToday);
        assert_eq!(panel.overflow[1].bill_id, 2);
    }
}
