// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal notification sink.
//!
//! Renders reminder prompts as colored lines on stdout. A terminal
//! cannot retract printed text, so `dismiss` only logs; the manager
//! still tracks the prompt slots as if the line had closed.

use std::io::IsTerminal;

use async_trait::async_trait;
use colored::Colorize;
use tracing::debug;

use billowl_core::{BillId, BillowlError, NotificationEvent, NotificationSink, Urgency};

/// Marker glyph for an urgency level, with a color-free fallback.
fn glyph(urgency: Urgency, use_color: bool) -> String {
    if use_color {
        match urgency {
            Urgency::Overdue => "✗".red().to_string(),
            Urgency::DueToday => "!".yellow().to_string(),
            Urgency::DueSoon => "•".cyan().to_string(),
            Urgency::NotDue => "·".normal().to_string(),
        }
    } else {
        match urgency {
            Urgency::Overdue => "[OVERDUE]".to_string(),
            Urgency::DueToday => "[TODAY]".to_string(),
            Urgency::DueSoon => "[SOON]".to_string(),
            Urgency::NotDue => "[LATER]".to_string(),
        }
    }
}

fn render_line(event: &NotificationEvent, use_color: bool) -> String {
    let marker = glyph(event.urgency, use_color);
    if use_color {
        match event.urgency {
            Urgency::Overdue => format!("  {marker} {}", event.message.red()),
            Urgency::DueToday => format!("  {marker} {}", event.message.yellow()),
            _ => format!("  {marker} {}", event.message),
        }
    } else {
        format!("  {marker} {}", event.message)
    }
}

/// [`NotificationSink`] that prints prompts to the terminal.
pub struct ConsoleSink {
    use_color: bool,
}

impl ConsoleSink {
    /// Colors enabled when stdout is a terminal.
    pub fn new() -> Self {
        Self {
            use_color: std::io::stdout().is_terminal(),
        }
    }

    /// Colors forced off, for `--plain` output and piped stdout.
    pub fn plain() -> Self {
        Self { use_color: false }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for ConsoleSink {
    async fn present(&self, event: &NotificationEvent) -> Result<(), BillowlError> {
        println!("{}", render_line(event, self.use_color));
        Ok(())
    }

    async fn dismiss(&self, bill_id: BillId) -> Result<(), BillowlError> {
        debug!(bill_id, "prompt dismissed");
        Ok(())
    }
}
