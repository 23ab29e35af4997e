// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory record of what has already been shown.
//!
//! The ledger is what keeps the scheduler from re-announcing the same
//! bill every tick. It lives only as long as the process: a restart
//! forgets suppression state and the next tick re-notifies anything
//! still due, which is the safe direction for reminders.

use std::collections::{HashMap, HashSet};

use billowl_core::{BillId, Urgency};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy)]
struct SentRecord {
    at: DateTime<Utc>,
    urgency: Urgency,
}

/// Suppression and snooze bookkeeping for the reminder scheduler.
#[derive(Debug, Default)]
pub struct ReminderLedger {
    sent: HashMap<BillId, SentRecord>,
    snoozed: HashMap<BillId, DateTime<Utc>>,
}

impl ReminderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a due bill should be announced now.
    ///
    /// A snooze deadline owns the decision while it exists: quiet before
    /// it, notify at or after it, even when the last send was recent.
    /// Otherwise a bill is quiet for `window` after its last send, unless
    /// `renotify_on_escalation` is set and its urgency has risen since.
    pub fn should_notify(
        &self,
        id: BillId,
        urgency: Urgency,
        now: DateTime<Utc>,
        window: Duration,
        renotify_on_escalation: bool,
    ) -> bool {
        if let Some(&until) = self.snoozed.get(&id) {
            return now >= until;
        }
        match self.sent.get(&id) {
            None => true,
            Some(rec) => {
                if now - rec.at >= window {
                    true
                } else {
                    renotify_on_escalation && urgency > rec.urgency
                }
            }
        }
    }

    /// Records a send, consuming any pending snooze for the bill.
    pub fn record_sent(&mut self, id: BillId, urgency: Urgency, now: DateTime<Utc>) {
        self.snoozed.remove(&id);
        self.sent.insert(id, SentRecord { at: now, urgency });
    }

    /// Quiets a bill until the given instant.
    pub fn snooze_until(&mut self, id: BillId, until: DateTime<Utc>) {
        self.snoozed.insert(id, until);
    }

    /// Forgets a bill entirely; the next time it is due it notifies as if
    /// never seen. Called when a bill is paid.
    pub fn clear(&mut self, id: BillId) {
        self.sent.remove(&id);
        self.snoozed.remove(&id);
    }

    /// Drops entries for bills no longer in the unpaid set, so deleted or
    /// externally-paid rows do not pin ledger state forever.
    pub fn prune(&mut self, live: &HashSet<BillId>) {
        self.sent.retain(|id, _| live.contains(id));
        self.snoozed.retain(|id, _| live.contains(id));
    }

    /// The pending snooze deadline for a bill, if any.
    pub fn snoozed_until(&self, id: BillId) -> Option<DateTime<Utc>> {
        self.snoozed.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn window() -> Duration {
        Duration::hours(24)
    }

    #[test]
    fn unseen_bill_notifies() {
        let ledger = ReminderLedger::new();
        assert!(ledger.should_notify(1, Urgency::DueSoon, ts("2026-03-10T09:00:00Z"), window(), false));
    }

    #[test]
    fn recent_send_suppresses_until_window_elapses() {
        let mut ledger = ReminderLedger::new();
        ledger.record_sent(1, Urgency::DueSoon, ts("2026-03-10T09:00:00Z"));

        assert!(!ledger.should_notify(1, Urgency::DueSoon, ts("2026-03-10T10:00:00Z"), window(), false));
        // Exactly at the window boundary notifies again.
        assert!(ledger.should_notify(1, Urgency::DueSoon, ts("2026-03-11T09:00:00Z"), window(), false));
    }

    #[test]
    fn escalation_renotifies_only_when_enabled() {
        let mut ledger = ReminderLedger::new();
        ledger.record_sent(1, Urgency::DueSoon, ts("2026-03-10T09:00:00Z"));
        let later = ts("2026-03-10T12:00:00Z");

        // Flag off: even a jump to overdue stays quiet.
        assert!(!ledger.should_notify(1, Urgency::Overdue, later, window(), false));
        // Flag on: higher urgency breaks through the window.
        assert!(ledger.should_notify(1, Urgency::Overdue, later, window(), true));
        // Same or lower urgency never does.
        assert!(!ledger.should_notify(1, Urgency::DueSoon, later, window(), true));
        assert!(!ledger.should_notify(1, Urgency::NotDue, later, window(), true));
    }

    #[test]
    fn active_snooze_quiets_even_unseen_bills() {
        let mut ledger = ReminderLedger::new();
        ledger.snooze_until(1, ts("2026-03-10T12:00:00Z"));
        assert!(!ledger.should_notify(1, Urgency::Overdue, ts("2026-03-10T11:59:59Z"), window(), false));
    }

    #[test]
    fn expired_snooze_overrides_send_suppression() {
        let mut ledger = ReminderLedger::new();
        ledger.record_sent(1, Urgency::DueSoon, ts("2026-03-10T09:00:00Z"));
        ledger.snooze_until(1, ts("2026-03-10T10:00:00Z"));

        // Deadline reached: the re-alert happens although the last send
        // was only an hour ago.
        assert!(ledger.should_notify(1, Urgency::DueSoon, ts("2026-03-10T10:00:00Z"), window(), false));
    }

    #[test]
    fn record_sent_consumes_the_snooze() {
        let mut ledger = ReminderLedger::new();
        ledger.snooze_until(1, ts("2026-03-10T10:00:00Z"));
        ledger.record_sent(1, Urgency::DueSoon, ts("2026-03-10T10:00:01Z"));

        assert!(ledger.snoozed_until(1).is_none());
        // Now back under normal window suppression.
        assert!(!ledger.should_notify(1, Urgency::DueSoon, ts("2026-03-10T11:00:00Z"), window(), false));
    }

    #[test]
    fn clear_forgets_everything_about_a_bill() {
        let mut ledger = ReminderLedger::new();
        ledger.record_sent(1, Urgency::DueSoon, ts("2026-03-10T09:00:00Z"));
        ledger.snooze_until(1, ts("2026-03-11T09:00:00Z"));
        ledger.clear(1);

        assert!(ledger.snoozed_until(1).is_none());
        assert!(ledger.should_notify(1, Urgency::DueSoon, ts("2026-03-10T09:05:00Z"), window(), false));
    }

    #[test]
    fn prune_drops_dead_ids_and_keeps_live() {
        let mut ledger = ReminderLedger::new();
        ledger.record_sent(1, Urgency::DueSoon, ts("2026-03-10T09:00:00Z"));
        ledger.record_sent(2, Urgency::DueToday, ts("2026-03-10T09:00:00Z"));
        ledger.snooze_until(3, ts("2026-03-11T09:00:00Z"));

        let live = HashSet::from([2]);
        ledger.prune(&live);

        assert!(ledger.should_notify(1, Urgency::DueSoon, ts("2026-03-10T09:05:00Z"), window(), false));
        assert!(!ledger.should_notify(2, Urgency::DueToday, ts("2026-03-10T09:05:00Z"), window(), false));
        assert!(ledger.snoozed_until(3).is_none());
    }
}
