// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`BillStore`] implementation backed by SQLite.

use async_trait::async_trait;
use billowl_config::model::StorageConfig;
use billowl_core::{
    Bill, BillId, BillPatch, BillStore, BillowlError, Category, HealthStatus, NewBill,
    PaymentMethod, StatusFilter,
};
use tracing::debug;

use crate::database::Database;
use crate::queries;

/// SQLite-backed bill store.
///
/// Owns the database handle for the lifetime of the process; `close`
/// checkpoints the WAL but the connection itself is released on drop.
pub struct SqliteBillStore {
    db: Database,
}

impl SqliteBillStore {
    /// Opens the database named by the storage config, creating the file
    /// and schema on first run.
    pub async fn open(config: &StorageConfig) -> Result<Self, BillowlError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite bill store initialized");
        Ok(Self { db })
    }

    /// In-memory store with the full schema, for tests.
    pub async fn open_in_memory() -> Result<Self, BillowlError> {
        let db = Database::open_in_memory().await?;
        Ok(Self { db })
    }
}

#[async_trait]
impl BillStore for SqliteBillStore {
    async fn health_check(&self) -> Result<HealthStatus, BillowlError> {
        let probe: Result<(), tokio_rusqlite::Error> = self
            .db
            .connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        match probe {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn close(&self) -> Result<(), BillowlError> {
        self.db.close().await
    }

    async fn fetch_unpaid_bills(&self) -> Result<Vec<Bill>, BillowlError> {
        queries::bills::fetch_unpaid(&self.db).await
    }

    async fn get_bill(&self, id: BillId) -> Result<Option<Bill>, BillowlError> {
        queries::bills::get_bill(&self.db, id).await
    }

    async fn list_bills(&self, filter: StatusFilter) -> Result<Vec<Bill>, BillowlError> {
        queries::bills::list_bills(&self.db, filter).await
    }

    async fn insert_bill(&self, bill: &NewBill) -> Result<BillId, BillowlError> {
        queries::bills::insert_bill(&self.db, bill).await
    }

    async fn update_bill(&self, id: BillId, patch: &BillPatch) -> Result<(), BillowlError> {
        queries::bills::update_bill(&self.db, id, patch).await
    }

    async fn mark_paid(&self, id: BillId, confirmation: Option<&str>) -> Result<(), BillowlError> {
        queries::bills::mark_paid(&self.db, id, confirmation.map(str::to_string)).await
    }

    async fn mark_unpaid(&self, id: BillId) -> Result<(), BillowlError> {
        queries::bills::mark_unpaid(&self.db, id).await
    }

    async fn begin_next_cycle(&self, id: BillId, next_due: &str) -> Result<(), BillowlError> {
        queries::bills::begin_next_cycle(&self.db, id, next_due.to_string()).await
    }

    async fn delete_bill(&self, id: BillId) -> Result<(), BillowlError> {
        queries::bills::delete_bill(&self.db, id).await
    }

    async fn insert_category(&self, name: &str) -> Result<i64, BillowlError> {
        queries::lookups::insert_category(&self.db, name).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, BillowlError> {
        queries::lookups::list_categories(&self.db).await
    }

    async fn insert_payment_method(
        &self,
        name: &str,
        is_automatic: bool,
    ) -> Result<i64, BillowlError> {
        queries::lookups::insert_payment_method(&self.db, name, is_automatic).await
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, BillowlError> {
        queries::lookups::list_payment_methods(&self.db).await
    }
}
