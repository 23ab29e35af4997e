// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presentation layer for billowl reminders.
//!
//! [`NotificationManager`] consumes the scheduler's event channel and
//! enforces the visible-prompt cap; [`ConsoleSink`] is the terminal
//! front end. Anything that can show and retract a prompt can stand in
//! for the sink via [`billowl_core::NotificationSink`].

pub mod console;
pub mod manager;

pub use console::ConsoleSink;
pub use manager::NotificationManager;
