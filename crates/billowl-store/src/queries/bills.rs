// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queries against the `bills` table.

use billowl_core::{Bill, BillId, BillPatch, BillingCycle, BillowlError, NewBill, StatusFilter};
use rusqlite::types::ToSql;

use crate::database::{Database, map_tr_err};

const BILL_COLUMNS: &str = "b.id, b.name, b.amount, b.due_date, b.billing_cycle, \
     b.reminder_days, b.paid, b.confirmation_number, b.category_id, \
     b.payment_method_id, b.created_at, b.updated_at";

fn row_to_bill(row: &rusqlite::Row) -> Result<Bill, rusqlite::Error> {
    let cycle_text: String = row.get(4)?;
    let billing_cycle = cycle_text.parse::<BillingCycle>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Bill {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        due_date: row.get(3)?,
        billing_cycle,
        reminder_days: row.get(5)?,
        paid: row.get(6)?,
        confirmation_number: row.get(7)?,
        category_id: row.get(8)?,
        payment_method_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Inserts a bill and returns its assigned rowid.
pub async fn insert_bill(db: &Database, bill: &NewBill) -> Result<BillId, BillowlError> {
    let bill = bill.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO bills (name, amount, due_date, billing_cycle, reminder_days, \
                 category_id, payment_method_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    bill.name,
                    bill.amount,
                    bill.due_date,
                    bill.billing_cycle.to_string(),
                    bill.reminder_days,
                    bill.category_id,
                    bill.payment_method_id,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetches a single bill by id.
pub async fn get_bill(db: &Database, id: BillId) -> Result<Option<Bill>, BillowlError> {
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {BILL_COLUMNS} FROM bills b WHERE b.id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            match stmt.query_row(rusqlite::params![id], row_to_bill) {
                Ok(bill) => Ok(Some(bill)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Lists bills matching the status filter, ordered by due date then id.
///
/// Unpaid bills split on their payment method: `AutoPay` requires a method
/// flagged `is_automatic`, `Pending` is every other unpaid bill, including
/// those with no method at all.
pub async fn list_bills(db: &Database, filter: StatusFilter) -> Result<Vec<Bill>, BillowlError> {
    db.connection()
        .call(move |conn| {
            let sql = match filter {
                StatusFilter::All => {
                    format!("SELECT {BILL_COLUMNS} FROM bills b ORDER BY b.due_date ASC, b.id ASC")
                }
                StatusFilter::Paid => format!(
                    "SELECT {BILL_COLUMNS} FROM bills b WHERE b.paid = 1 \
                     ORDER BY b.due_date ASC, b.id ASC"
                ),
                StatusFilter::AutoPay => format!(
                    "SELECT {BILL_COLUMNS} FROM bills b \
                     JOIN payment_methods pm ON pm.id = b.payment_method_id \
                     WHERE b.paid = 0 AND pm.is_automatic = 1 \
                     ORDER BY b.due_date ASC, b.id ASC"
                ),
                StatusFilter::Pending => format!(
                    "SELECT {BILL_COLUMNS} FROM bills b \
                     LEFT JOIN payment_methods pm ON pm.id = b.payment_method_id \
                     WHERE b.paid = 0 AND (pm.id IS NULL OR pm.is_automatic = 0) \
                     ORDER BY b.due_date ASC, b.id ASC"
                ),
            };
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_bill)?;
            let mut bills = Vec::new();
            for row in rows {
                bills.push(row?);
            }
            Ok(bills)
        })
        .await
        .map_err(map_tr_err)
}

/// All unpaid bills in stable id order. The reminder scheduler calls this
/// every tick and does its own due-date ordering.
pub async fn fetch_unpaid(db: &Database) -> Result<Vec<Bill>, BillowlError> {
    db.connection()
        .call(|conn| {
            let sql = format!("SELECT {BILL_COLUMNS} FROM bills b WHERE b.paid = 0 ORDER BY b.id ASC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_bill)?;
            let mut bills = Vec::new();
            for row in rows {
                bills.push(row?);
            }
            Ok(bills)
        })
        .await
        .map_err(map_tr_err)
}

/// Applies a partial update. A patch that sets nothing is a no-op; an
/// unknown id is `BillNotFound`.
pub async fn update_bill(db: &Database, id: BillId, patch: &BillPatch) -> Result<(), BillowlError> {
    if patch.is_empty() {
        return Ok(());
    }
    let patch = patch.clone();
    let affected = db
        .connection()
        .call(move |conn| {
            let mut sets: Vec<String> = Vec::new();
            let mut params: Vec<Box<dyn ToSql + Send>> = Vec::new();
            if let Some(name) = patch.name {
                sets.push(format!("name = ?{}", params.len() + 1));
                params.push(Box::new(name));
            }
            if let Some(amount) = patch.amount {
                sets.push(format!("amount = ?{}", params.len() + 1));
                params.push(Box::new(amount));
            }
            if let Some(due_date) = patch.due_date {
                sets.push(format!("due_date = ?{}", params.len() + 1));
                params.push(Box::new(due_date));
            }
            if let Some(cycle) = patch.billing_cycle {
                sets.push(format!("billing_cycle = ?{}", params.len() + 1));
                params.push(Box::new(cycle.to_string()));
            }
            if let Some(days) = patch.reminder_days {
                sets.push(format!("reminder_days = ?{}", params.len() + 1));
                params.push(Box::new(days));
            }
            if let Some(category_id) = patch.category_id {
                sets.push(format!("category_id = ?{}", params.len() + 1));
                params.push(Box::new(category_id));
            }
            if let Some(payment_method_id) = patch.payment_method_id {
                sets.push(format!("payment_method_id = ?{}", params.len() + 1));
                params.push(Box::new(payment_method_id));
            }
            sets.push("updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')".to_string());

            let sql = format!(
                "UPDATE bills SET {} WHERE id = ?{}",
                sets.join(", "),
                params.len() + 1
            );
            params.push(Box::new(id));
            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref() as &dyn ToSql).collect();
            let n = conn.execute(&sql, param_refs.as_slice())?;
            Ok(n)
        })
        .await
        .map_err(map_tr_err)?;
    if affected == 0 {
        return Err(BillowlError::BillNotFound { id });
    }
    Ok(())
}

/// Marks a bill paid, storing the confirmation number when given.
pub async fn mark_paid(
    db: &Database,
    id: BillId,
    confirmation: Option<String>,
) -> Result<(), BillowlError> {
    let affected = db
        .connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE bills SET paid = 1, confirmation_number = ?1, \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
                 WHERE id = ?2",
                rusqlite::params![confirmation, id],
            )?;
            Ok(n)
        })
        .await
        .map_err(map_tr_err)?;
    if affected == 0 {
        return Err(BillowlError::BillNotFound { id });
    }
    Ok(())
}

/// Marks a bill unpaid. The confirmation number always goes with it.
pub async fn mark_unpaid(db: &Database, id: BillId) -> Result<(), BillowlError> {
    let affected = db
        .connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE bills SET paid = 0, confirmation_number = NULL, \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
                 WHERE id = ?1",
                rusqlite::params![id],
            )?;
            Ok(n)
        })
        .await
        .map_err(map_tr_err)?;
    if affected == 0 {
        return Err(BillowlError::BillNotFound { id });
    }
    Ok(())
}

/// Rolls a bill into its next cycle: new due date, unpaid, confirmation
/// cleared. One statement so a crash can never leave the bill half-rolled.
pub async fn begin_next_cycle(
    db: &Database,
    id: BillId,
    next_due: String,
) -> Result<(), BillowlError> {
    let affected = db
        .connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE bills SET due_date = ?1, paid = 0, confirmation_number = NULL, \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
                 WHERE id = ?2",
                rusqlite::params![next_due, id],
            )?;
            Ok(n)
        })
        .await
        .map_err(map_tr_err)?;
    if affected == 0 {
        return Err(BillowlError::BillNotFound { id });
    }
    Ok(())
}

/// Deletes a bill.
pub async fn delete_bill(db: &Database, id: BillId) -> Result<(), BillowlError> {
    let affected = db
        .connection()
        .call(move |conn| {
            let n = conn.execute("DELETE FROM bills WHERE id = ?1", rusqlite::params![id])?;
            Ok(n)
        })
        .await
        .map_err(map_tr_err)?;
    if affected == 0 {
        return Err(BillowlError::BillNotFound { id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn make_bill(name: &str, due_date: &str) -> NewBill {
        NewBill {
            name: name.to_string(),
            amount: 42.50,
            due_date: due_date.to_string(),
            billing_cycle: BillingCycle::Monthly,
            reminder_days: 3,
            category_id: None,
            payment_method_id: None,
        }
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let db = setup_db().await;
        let id = insert_bill(&db, &make_bill("Electric", "2026-09-01"))
            .await
            .unwrap();

        let bill = get_bill(&db, id).await.unwrap().unwrap();
        assert_eq!(bill.id, id);
        assert_eq!(bill.name, "Electric");
        assert_eq!(bill.amount, 42.50);
        assert_eq!(bill.due_date, "2026-09-01");
        assert_eq!(bill.billing_cycle, BillingCycle::Monthly);
        assert_eq!(bill.reminder_days, 3);
        assert!(!bill.paid);
        assert!(bill.confirmation_number.is_none());
        assert!(!bill.created_at.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_bill_returns_none() {
        let db = setup_db().await;
        assert!(get_bill(&db, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_unpaid_skips_paid_bills() {
        let db = setup_db().await;
        let a = insert_bill(&db, &make_bill("A", "2026-09-01")).await.unwrap();
        let b = insert_bill(&db, &make_bill("B", "2026-09-02")).await.unwrap();
        mark_paid(&db, a, None).await.unwrap();

        let unpaid = fetch_unpaid(&db).await.unwrap();
        assert_eq!(unpaid.len(), 1);
        assert_eq!(unpaid[0].id, b);
    }

    #[tokio::test]
    async fn fetch_unpaid_is_id_ordered() {
        let db = setup_db().await;
        // Later due date inserted first; id order must win here.
        let a = insert_bill(&db, &make_bill("Late", "2026-12-01")).await.unwrap();
        let b = insert_bill(&db, &make_bill("Early", "2026-09-01")).await.unwrap();

        let unpaid = fetch_unpaid(&db).await.unwrap();
        assert_eq!(unpaid.iter().map(|b| b.id).collect::<Vec<_>>(), vec![a, b]);
    }

    #[tokio::test]
    async fn mark_paid_stores_confirmation() {
        let db = setup_db().await;
        let id = insert_bill(&db, &make_bill("Water", "2026-09-10")).await.unwrap();

        mark_paid(&db, id, Some("CONF-123".to_string())).await.unwrap();
        let bill = get_bill(&db, id).await.unwrap().unwrap();
        assert!(bill.paid);
        assert_eq!(bill.confirmation_number.as_deref(), Some("CONF-123"));
    }

    #[tokio::test]
    async fn mark_unpaid_clears_confirmation() {
        let db = setup_db().await;
        let id = insert_bill(&db, &make_bill("Water", "2026-09-10")).await.unwrap();
        mark_paid(&db, id, Some("CONF-123".to_string())).await.unwrap();

        mark_unpaid(&db, id).await.unwrap();
        let bill = get_bill(&db, id).await.unwrap().unwrap();
        assert!(!bill.paid);
        assert!(bill.confirmation_number.is_none());
    }

    #[tokio::test]
    async fn mark_paid_unknown_id_is_not_found() {
        let db = setup_db().await;
        let err = mark_paid(&db, 77, None).await.unwrap_err();
        assert!(matches!(err, BillowlError::BillNotFound { id: 77 }));
    }

    #[tokio::test]
    async fn begin_next_cycle_resets_payment_state() {
        let db = setup_db().await;
        let id = insert_bill(&db, &make_bill("Rent", "2026-09-01")).await.unwrap();
        mark_paid(&db, id, Some("ACK".to_string())).await.unwrap();

        begin_next_cycle(&db, id, "2026-10-01".to_string()).await.unwrap();
        let bill = get_bill(&db, id).await.unwrap().unwrap();
        assert_eq!(bill.due_date, "2026-10-01");
        assert!(!bill.paid);
        assert!(bill.confirmation_number.is_none());
    }

    #[tokio::test]
    async fn update_bill_applies_only_set_fields() {
        let db = setup_db().await;
        let id = insert_bill(&db, &make_bill("Gym", "2026-09-15")).await.unwrap();

        let patch = BillPatch {
            amount: Some(19.99),
            reminder_days: Some(7),
            ..BillPatch::default()
        };
        update_bill(&db, id, &patch).await.unwrap();

        let bill = get_bill(&db, id).await.unwrap().unwrap();
        assert_eq!(bill.amount, 19.99);
        assert_eq!(bill.reminder_days, 7);
        // Untouched fields survive.
        assert_eq!(bill.name, "Gym");
        assert_eq!(bill.due_date, "2026-09-15");
    }

    #[tokio::test]
    async fn update_bill_empty_patch_is_noop() {
        let db = setup_db().await;
        let id = insert_bill(&db, &make_bill("Gym", "2026-09-15")).await.unwrap();
        update_bill(&db, id, &BillPatch::default()).await.unwrap();
        // Even against a missing id an empty patch succeeds.
        update_bill(&db, 999, &BillPatch::default()).await.unwrap();

        let bill = get_bill(&db, id).await.unwrap().unwrap();
        assert_eq!(bill.name, "Gym");
    }

    #[tokio::test]
    async fn update_bill_unknown_id_is_not_found() {
        let db = setup_db().await;
        let patch = BillPatch {
            name: Some("x".to_string()),
            ..BillPatch::default()
        };
        let err = update_bill(&db, 5, &patch).await.unwrap_err();
        assert!(matches!(err, BillowlError::BillNotFound { id: 5 }));
    }

    #[tokio::test]
    async fn delete_bill_removes_row() {
        let db = setup_db().await;
        let id = insert_bill(&db, &make_bill("Old", "2026-09-01")).await.unwrap();
        delete_bill(&db, id).await.unwrap();
        assert!(get_bill(&db, id).await.unwrap().is_none());

        let err = delete_bill(&db, id).await.unwrap_err();
        assert!(matches!(err, BillowlError::BillNotFound { .. }));
    }

    #[tokio::test]
    async fn list_bills_filters_by_payment_method() {
        let db = setup_db().await;
        let auto = crate::queries::lookups::insert_payment_method(&db, "Autopay Card", true)
            .await
            .unwrap();
        let manual = crate::queries::lookups::insert_payment_method(&db, "Checking", false)
            .await
            .unwrap();

        let mut on_auto = make_bill("Streaming", "2026-09-05");
        on_auto.payment_method_id = Some(auto);
        let auto_id = insert_bill(&db, &on_auto).await.unwrap();

        let mut on_manual = make_bill("Electric", "2026-09-03");
        on_manual.payment_method_id = Some(manual);
        let manual_id = insert_bill(&db, &on_manual).await.unwrap();

        let no_method_id = insert_bill(&db, &make_bill("Rent", "2026-09-01")).await.unwrap();
        let paid_id = insert_bill(&db, &make_bill("Water", "2026-09-02")).await.unwrap();
        mark_paid(&db, paid_id, None).await.unwrap();

        let all = list_bills(&db, StatusFilter::All).await.unwrap();
        assert_eq!(all.len(), 4);
        // Due-date order.
        assert_eq!(all[0].id, no_method_id);

        let paid = list_bills(&db, StatusFilter::Paid).await.unwrap();
        assert_eq!(paid.iter().map(|b| b.id).collect::<Vec<_>>(), vec![paid_id]);

        let autopay = list_bills(&db, StatusFilter::AutoPay).await.unwrap();
        assert_eq!(autopay.iter().map(|b| b.id).collect::<Vec<_>>(), vec![auto_id]);

        let pending = list_bills(&db, StatusFilter::Pending).await.unwrap();
        assert_eq!(
            pending.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![no_method_id, manual_id]
        );
    }

    #[tokio::test]
    async fn billing_cycle_survives_round_trip() {
        let db = setup_db().await;
        let mut bill = make_bill("Insurance", "2026-09-01");
        bill.billing_cycle = BillingCycle::SemiAnnually;
        let id = insert_bill(&db, &bill).await.unwrap();

        let stored = get_bill(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.billing_cycle, BillingCycle::SemiAnnually);
    }
}
