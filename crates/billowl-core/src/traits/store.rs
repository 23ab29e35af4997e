// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bill store trait for persistence backends.

use async_trait::async_trait;

use crate::error::BillowlError;
use crate::types::{
    Bill, BillId, BillPatch, Category, HealthStatus, NewBill, PaymentMethod, StatusFilter,
};

/// Persistence seam for bills, categories, and payment methods.
///
/// The reminder scheduler only consumes `fetch_unpaid_bills` plus the
/// payment mutations; the rest of the surface serves bill management.
/// Implementations own connection lifecycle and must keep the invariant
/// that `confirmation_number` is cleared on every write that clears
/// `paid`.
#[async_trait]
pub trait BillStore: Send + Sync {
    /// Verifies the backend is reachable and the schema is usable.
    async fn health_check(&self) -> Result<HealthStatus, BillowlError>;

    /// Flushes pending writes and releases the connection.
    async fn close(&self) -> Result<(), BillowlError>;

    /// All bills with `paid = false`, in stable id order. The scheduler
    /// calls this every tick.
    async fn fetch_unpaid_bills(&self) -> Result<Vec<Bill>, BillowlError>;

    /// Looks up a single bill.
    async fn get_bill(&self, id: BillId) -> Result<Option<Bill>, BillowlError>;

    /// Bills matching the status filter, in ascending due-date order.
    async fn list_bills(&self, filter: StatusFilter) -> Result<Vec<Bill>, BillowlError>;

    /// Creates a bill and returns its assigned id.
    async fn insert_bill(&self, bill: &NewBill) -> Result<BillId, BillowlError>;

    /// Applies a partial update. Errors with `BillNotFound` when the id
    /// does not exist.
    async fn update_bill(&self, id: BillId, patch: &BillPatch) -> Result<(), BillowlError>;

    /// Marks a bill paid, recording the confirmation number when given.
    async fn mark_paid(
        &self,
        id: BillId,
        confirmation: Option<&str>,
    ) -> Result<(), BillowlError>;

    /// Marks a bill unpaid and clears its confirmation number.
    async fn mark_unpaid(&self, id: BillId) -> Result<(), BillowlError>;

    /// Rolls a bill into its next cycle: new due date, unpaid,
    /// confirmation cleared.
    async fn begin_next_cycle(&self, id: BillId, next_due: &str) -> Result<(), BillowlError>;

    /// Removes a bill. Only ever driven by explicit user action.
    async fn delete_bill(&self, id: BillId) -> Result<(), BillowlError>;

    /// Creates a category and returns its id.
    async fn insert_category(&self, name: &str) -> Result<i64, BillowlError>;

    /// All categories in name order.
    async fn list_categories(&self) -> Result<Vec<Category>, BillowlError>;

    /// Creates a payment method and returns its id.
    async fn insert_payment_method(
        &self,
        name: &str,
        is_automatic: bool,
    ) -> Result<i64, BillowlError>;

    /// All payment methods in name order.
    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, BillowlError>;
}
