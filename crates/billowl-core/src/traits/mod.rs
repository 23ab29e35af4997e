// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the reminder engine and its collaborators.
//!
//! Both traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn ...>` trait objects.

pub mod sink;
pub mod store;

pub use sink::NotificationSink;
pub use store::BillStore;
