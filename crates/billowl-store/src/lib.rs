// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for billowl.
//!
//! Provides WAL-mode SQLite storage with an idempotent schema, a
//! single-writer concurrency model via `tokio-rusqlite`, and a
//! [`billowl_core::BillStore`] adapter over typed bill, category, and
//! payment-method queries.

pub mod adapter;
pub mod database;
pub mod queries;

pub use adapter::SqliteBillStore;
pub use database::Database;
