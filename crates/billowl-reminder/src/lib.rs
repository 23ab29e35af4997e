// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Due-date evaluation and the background reminder scheduler.
//!
//! Split into three layers:
//! - [`evaluator`]: pure classification of bills against a date
//! - [`ledger`]: in-memory suppression and snooze bookkeeping
//! - [`service`]: the interval-driven worker that ties them to the store
//!   and emits [`billowl_core::NotificationEvent`]s

pub mod evaluator;
pub mod ledger;
pub mod service;

pub use evaluator::{Evaluation, build_event, classify, reminder_message, within_horizon};
pub use ledger::ReminderLedger;
pub use service::ReminderService;
