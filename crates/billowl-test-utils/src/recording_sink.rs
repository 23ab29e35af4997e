// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sink that records everything it is asked to render.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use billowl_core::{BillId, BillowlError, NotificationEvent, NotificationSink};

/// A [`NotificationSink`] for assertions.
///
/// Captures presented events and dismissed bill ids; `fail_presents()`
/// turns every `present` call into a `Notify` error so tests can check
/// that display failures stay non-fatal.
pub struct RecordingSink {
    presented: Arc<Mutex<Vec<NotificationEvent>>>,
    dismissed: Arc<Mutex<Vec<BillId>>>,
    failing: std::sync::atomic::AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            presented: Arc::new(Mutex::new(Vec::new())),
            dismissed: Arc::new(Mutex::new(Vec::new())),
            failing: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn fail_presents(&self) {
        self.failing.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn recover_presents(&self) {
        self.failing.store(false, std::sync::atomic::Ordering::SeqCst);
    }

    /// All events presented so far, in order.
    pub async fn presented(&self) -> Vec<NotificationEvent> {
        self.presented.lock().await.clone()
    }

    pub async fn presented_count(&self) -> usize {
        self.presented.lock().await.len()
    }

    /// All bill ids dismissed so far, in order.
    pub async fn dismissed(&self) -> Vec<BillId> {
        self.dismissed.lock().await.clone()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn present(&self, event: &NotificationEvent) -> Result<(), BillowlError> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(BillowlError::Notify {
                message: "recording sink set to fail".to_string(),
                source: None,
            });
        }
        self.presented.lock().await.push(event.clone());
        Ok(())
    }

    async fn dismiss(&self, bill_id: BillId) -> Result<(), BillowlError> {
        self.dismissed.lock().await.push(bill_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billowl_core::Urgency;

    fn make_event(bill_id: BillId) -> NotificationEvent {
        NotificationEvent {
            bill_id,
            bill_name: "Electric".to_string(),
            amount: 42.5,
            due_date: "2026-09-01".parse().unwrap(),
            days_until_due: 2,
            urgency: Urgency::DueSoon,
            message: "Electric is due in 2 days ($42.50)".to_string(),
        }
    }

    #[tokio::test]
    async fn records_presents_and_dismissals_in_order() {
        let sink = RecordingSink::new();
        sink.present(&make_event(1)).await.unwrap();
        sink.present(&make_event(2)).await.unwrap();
        sink.dismiss(1).await.unwrap();

        let presented = sink.presented().await;
        assert_eq!(presented.len(), 2);
        assert_eq!(presented[0].bill_id, 1);
        assert_eq!(sink.dismissed().await, vec![1]);
    }

    #[tokio::test]
    async fn fail_presents_returns_notify_error() {
        let sink = RecordingSink::new();
        sink.fail_presents();
        let err = sink.present(&make_event(1)).await.unwrap_err();
        assert!(matches!(err, BillowlError::Notify { .. }));
        assert_eq!(sink.presented_count().await, 0);
    }
}
