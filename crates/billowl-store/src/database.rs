// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection handling and schema management for the billowl database.

use std::path::Path;

use billowl_core::BillowlError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Idempotent schema. Applied on every open so a fresh database file and an
/// existing one go through the same path.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS payment_methods (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL UNIQUE,
    is_automatic INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS bills (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                TEXT NOT NULL,
    amount              REAL NOT NULL DEFAULT 0,
    due_date            TEXT NOT NULL,
    billing_cycle       TEXT NOT NULL DEFAULT 'monthly',
    reminder_days       INTEGER NOT NULL DEFAULT 3 CHECK (reminder_days >= 0),
    paid                INTEGER NOT NULL DEFAULT 0,
    confirmation_number TEXT,
    category_id         INTEGER REFERENCES categories(id) ON DELETE SET NULL,
    payment_method_id   INTEGER REFERENCES payment_methods(id) ON DELETE SET NULL,
    created_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    CHECK (paid = 1 OR confirmation_number IS NULL)
);

CREATE INDEX IF NOT EXISTS idx_bills_paid ON bills(paid);
CREATE INDEX IF NOT EXISTS idx_bills_due_date ON bills(due_date);
"#;

/// Maps a tokio-rusqlite error into the store error variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> BillowlError {
    BillowlError::Store {
        source: Box::new(e),
    }
}

/// Handle to the SQLite database backing all bill state.
///
/// Wraps a [`tokio_rusqlite::Connection`] so queries run on a dedicated
/// blocking thread while callers stay async.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and applies the
    /// schema. Parent directories are created when missing.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, BillowlError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| BillowlError::Store {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;
        Self::prepare(&conn, wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// In-memory database with the same schema, for tests and `doctor` probes.
    pub async fn open_in_memory() -> Result<Self, BillowlError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| map_tr_err(e.into()))?;
        Self::prepare(&conn, false).await?;
        Ok(Self { conn })
    }

    async fn prepare(conn: &Connection, wal_mode: bool) -> Result<(), BillowlError> {
        conn.call(move |conn| {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;\n\
                 PRAGMA busy_timeout = 5000;\n\
                 PRAGMA synchronous = NORMAL;",
            )?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
    }

    /// Raw connection handle for the query modules.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Flushes the WAL into the main database file.
    ///
    /// Called on shutdown so a crash after close loses nothing; harmless when
    /// the database is not in WAL mode.
    pub async fn checkpoint(&self) -> Result<(), BillowlError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoints the WAL ahead of shutdown. The underlying connection is
    /// dropped with the handle.
    pub async fn close(&self) -> Result<(), BillowlError> {
        self.checkpoint().await?;
        debug!("database closed");
        Ok(())
    }
}
