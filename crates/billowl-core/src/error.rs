// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the billowl workspace.

use thiserror::Error;

use crate::types::BillId;

/// The primary error type used across all billowl crates.
///
/// The reminder loop treats every variant as recoverable: a `Data` error
/// skips one bill, a `Store` error aborts one tick, a `Notify` error is
/// logged and dropped. Nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum BillowlError {
    /// Configuration errors (invalid TOML, unknown keys, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Bill store errors (database open, query or update failure).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A bill row that cannot be classified, usually a missing or
    /// malformed due date. Carries the offending bill when known.
    #[error("bill data error: {message}")]
    Data {
        bill_id: Option<BillId>,
        message: String,
    },

    /// Notification display errors (sink gone, render failure).
    #[error("notification error: {message}")]
    Notify {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Referenced bill does not exist.
    #[error("bill not found: {id}")]
    BillNotFound { id: BillId },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
