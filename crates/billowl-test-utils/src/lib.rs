// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for billowl integration tests.
//!
//! Provides mocks and harness infrastructure for fast, deterministic,
//! CI-runnable tests without touching the real data directory or the
//! wall clock.
//!
//! # Components
//!
//! - [`MockStore`] - In-memory bill store with an injectable failure switch
//! - [`ManualClock`] - Clock that only moves when the test advances it
//! - [`RecordingSink`] - Notification sink that captures everything rendered
//! - [`TestHarness`] - Temp-database SQLite store plus config and clock

pub mod clock;
pub mod harness;
pub mod mock_store;
pub mod recording_sink;

pub use clock::ManualClock;
pub use harness::TestHarness;
pub use mock_store::MockStore;
pub use recording_sink::RecordingSink;
