// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a real SQLite store on a temp database, a
//! manual clock, and a ready-made config. Tests wire the reminder service
//! and notification manager on top of these parts.

use std::sync::Arc;

use billowl_config::model::{
    BillowlConfig, NotificationsConfig, ReminderConfig, StorageConfig,
};
use billowl_core::{BillId, BillStore, BillingCycle, BillowlError, NewBill};
use billowl_store::SqliteBillStore;
use chrono::{DateTime, Utc};

use crate::clock::ManualClock;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    start_time: DateTime<Utc>,
    reminders: ReminderConfig,
    notifications: NotificationsConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            // Fixed start instant so date arithmetic in tests is stable.
            start_time: "2026-03-10T09:00:00Z"
                .parse()
                .unwrap_or(DateTime::UNIX_EPOCH),
            reminders: ReminderConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }

    /// Set the manual clock's starting instant.
    pub fn at_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = start;
        self
    }

    pub fn with_check_interval(mut self, secs: u64) -> Self {
        self.reminders.check_interval_secs = secs;
        self
    }

    pub fn with_suppression_window(mut self, secs: u64) -> Self {
        self.reminders.suppression_window_secs = secs;
        self
    }

    pub fn with_escalation_renotify(mut self) -> Self {
        self.reminders.renotify_on_escalation = true;
        self
    }

    pub fn with_max_visible(mut self, max: usize) -> Self {
        self.notifications.max_visible = max;
        self
    }

    pub fn with_auto_close(mut self, secs: u64) -> Self {
        self.notifications.auto_close_secs = Some(secs);
        self
    }

    /// Build the test harness, creating the temp database.
    pub async fn build(self) -> Result<TestHarness, BillowlError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| BillowlError::Store {
            source: Box::new(e),
        })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };
        let store = SqliteBillStore::open(&storage).await?;

        let config = BillowlConfig {
            storage,
            reminders: self.reminders,
            notifications: self.notifications,
            ..BillowlConfig::default()
        };

        Ok(TestHarness {
            store: Arc::new(store),
            clock: Arc::new(ManualClock::new(self.start_time)),
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment: temp SQLite store, manual clock, config.
pub struct TestHarness {
    /// Real SQLite store on a temp database (cleaned up on drop).
    pub store: Arc<dyn BillStore>,
    /// Manual clock driving classification and suppression windows.
    pub clock: Arc<ManualClock>,
    /// Config assembled from the builder's options.
    pub config: BillowlConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Insert an unpaid monthly bill and return its id.
    pub async fn seed_bill(
        &self,
        name: &str,
        due_date: &str,
        reminder_days: u32,
    ) -> Result<BillId, BillowlError> {
        self.store
            .insert_bill(&NewBill {
                name: name.to_string(),
                amount: 42.50,
                due_date: due_date.to_string(),
                billing_cycle: BillingCycle::Monthly,
                reminder_days,
                category_id: None,
                payment_method_id: None,
            })
            .await
    }
}
