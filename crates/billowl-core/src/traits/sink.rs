// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presentation sink trait for reminder prompts.

use async_trait::async_trait;

use crate::error::BillowlError;
use crate::types::{BillId, NotificationEvent};

/// Rendering backend for reminder prompts.
///
/// A graphical front end implements this to create real prompt windows;
/// the CLI ships a console sink. Sinks only render and retract. Every
/// decision about what to show, when, and how many at once belongs to the
/// notification manager, and due-date logic never reaches a sink at all.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Displays a prompt for the event.
    async fn present(&self, event: &NotificationEvent) -> Result<(), BillowlError>;

    /// Retracts the prompt for a bill. Backends that cannot retract
    /// (e.g. a terminal) treat this as a no-op.
    async fn dismiss(&self, bill_id: BillId) -> Result<(), BillowlError>;
}
