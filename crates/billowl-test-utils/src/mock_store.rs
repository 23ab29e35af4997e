// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock bill store for deterministic testing.
//!
//! `MockStore` implements `BillStore` over an in-memory table, with a
//! failure switch so tests can exercise the scheduler's store-error path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use billowl_core::{
    Bill, BillId, BillPatch, BillStore, BillingCycle, BillowlError, Category, HealthStatus,
    NewBill, PaymentMethod, StatusFilter,
};

/// In-memory [`BillStore`] for tests.
///
/// Ids are assigned from a counter starting at 1. `fail_all()` makes every
/// subsequent call return a `Store` error until `recover()` is called.
pub struct MockStore {
    bills: Arc<Mutex<Vec<Bill>>>,
    categories: Arc<Mutex<Vec<Category>>>,
    payment_methods: Arc<Mutex<Vec<PaymentMethod>>>,
    next_id: AtomicI64,
    failing: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            bills: Arc::new(Mutex::new(Vec::new())),
            categories: Arc::new(Mutex::new(Vec::new())),
            payment_methods: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicI64::new(1),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every store call fail with a `Store` error.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Undo [`MockStore::fail_all`].
    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    /// Insert a fully-formed bill row, bypassing `NewBill` defaults. Useful
    /// for seeding malformed due dates that the real store would accept
    /// anyway (due dates are stored as raw text).
    pub async fn seed_bill(&self, mut bill: Bill) -> BillId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        bill.id = id;
        self.bills.lock().await.push(bill);
        id
    }

    /// Convenience for seeding an unpaid bill with the given due date.
    pub async fn seed_unpaid(&self, name: &str, due_date: &str, reminder_days: u32) -> BillId {
        self.seed_bill(Bill {
            id: 0,
            name: name.to_string(),
            amount: 25.0,
            due_date: due_date.to_string(),
            billing_cycle: BillingCycle::Monthly,
            reminder_days,
            paid: false,
            confirmation_number: None,
            category_id: None,
            payment_method_id: None,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        })
        .await
    }

    fn check_failing(&self) -> Result<(), BillowlError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BillowlError::Store {
                source: "mock store failure".into(),
            });
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BillStore for MockStore {
    async fn health_check(&self) -> Result<HealthStatus, BillowlError> {
        if self.failing.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("mock store failure".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn close(&self) -> Result<(), BillowlError> {
        Ok(())
    }

    async fn fetch_unpaid_bills(&self) -> Result<Vec<Bill>, BillowlError> {
        self.check_failing()?;
        let bills = self.bills.lock().await;
        let mut unpaid: Vec<Bill> = bills.iter().filter(|b| !b.paid).cloned().collect();
        unpaid.sort_by_key(|b| b.id);
        Ok(unpaid)
    }

    async fn get_bill(&self, id: BillId) -> Result<Option<Bill>, BillowlError> {
        self.check_failing()?;
        Ok(self.bills.lock().await.iter().find(|b| b.id == id).cloned())
    }

    async fn list_bills(&self, filter: StatusFilter) -> Result<Vec<Bill>, BillowlError> {
        self.check_failing()?;
        let methods = self.payment_methods.lock().await;
        let is_auto = |bill: &Bill| {
            bill.payment_method_id
                .and_then(|id| methods.iter().find(|m| m.id == id))
                .is_some_and(|m| m.is_automatic)
        };
        let bills = self.bills.lock().await;
        let mut out: Vec<Bill> = bills
            .iter()
            .filter(|b| match filter {
                StatusFilter::All => true,
                StatusFilter::Paid => b.paid,
                StatusFilter::AutoPay => !b.paid && is_auto(b),
                StatusFilter::Pending => !b.paid && !is_auto(b),
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| (&a.due_date, a.id).cmp(&(&b.due_date, b.id)));
        Ok(out)
    }

    async fn insert_bill(&self, bill: &NewBill) -> Result<BillId, BillowlError> {
        self.check_failing()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.bills.lock().await.push(Bill {
            id,
            name: bill.name.clone(),
            amount: bill.amount,
            due_date: bill.due_date.clone(),
            billing_cycle: bill.billing_cycle,
            reminder_days: bill.reminder_days,
            paid: false,
            confirmation_number: None,
            category_id: bill.category_id,
            payment_method_id: bill.payment_method_id,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        });
        Ok(id)
    }

    async fn update_bill(&self, id: BillId, patch: &BillPatch) -> Result<(), BillowlError> {
        self.check_failing()?;
        if patch.is_empty() {
            return Ok(());
        }
        let mut bills = self.bills.lock().await;
        let bill = bills
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(BillowlError::BillNotFound { id })?;
        if let Some(name) = &patch.name {
            bill.name = name.clone();
        }
        if let Some(amount) = patch.amount {
            bill.amount = amount;
        }
        if let Some(due_date) = &patch.due_date {
            bill.due_date = due_date.clone();
        }
        if let Some(cycle) = patch.billing_cycle {
            bill.billing_cycle = cycle;
        }
        if let Some(days) = patch.reminder_days {
            bill.reminder_days = days;
        }
        if let Some(category_id) = patch.category_id {
            bill.category_id = Some(category_id);
        }
        if let Some(payment_method_id) = patch.payment_method_id {
            bill.payment_method_id = Some(payment_method_id);
        }
        Ok(())
    }

    async fn mark_paid(&self, id: BillId, confirmation: Option<&str>) -> Result<(), BillowlError> {
        self.check_failing()?;
        let mut bills = self.bills.lock().await;
        let bill = bills
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(BillowlError::BillNotFound { id })?;
        bill.paid = true;
        bill.confirmation_number = confirmation.map(str::to_string);
        Ok(())
    }

    async fn mark_unpaid(&self, id: BillId) -> Result<(), BillowlError> {
        self.check_failing()?;
        let mut bills = self.bills.lock().await;
        let bill = bills
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(BillowlError::BillNotFound { id })?;
        bill.paid = false;
        bill.confirmation_number = None;
        Ok(())
    }

    async fn begin_next_cycle(&self, id: BillId, next_due: &str) -> Result<(), BillowlError> {
        self.check_failing()?;
        let mut bills = self.bills.lock().await;
        let bill = bills
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(BillowlError::BillNotFound { id })?;
        bill.due_date = next_due.to_string();
        bill.paid = false;
        bill.confirmation_number = None;
        Ok(())
    }

    async fn delete_bill(&self, id: BillId) -> Result<(), BillowlError> {
        self.check_failing()?;
        let mut bills = self.bills.lock().await;
        let before = bills.len();
        bills.retain(|b| b.id != id);
        if bills.len() == before {
            return Err(BillowlError::BillNotFound { id });
        }
        Ok(())
    }

    async fn insert_category(&self, name: &str) -> Result<i64, BillowlError> {
        self.check_failing()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.categories.lock().await.push(Category {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, BillowlError> {
        self.check_failing()?;
        let mut out = self.categories.lock().await.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn insert_payment_method(
        &self,
        name: &str,
        is_automatic: bool,
    ) -> Result<i64, BillowlError> {
        self.check_failing()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.payment_methods.lock().await.push(PaymentMethod {
            id,
            name: name.to_string(),
            is_automatic,
        });
        Ok(id)
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, BillowlError> {
        self.check_failing()?;
        let mut out = self.payment_methods.lock().await.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}
