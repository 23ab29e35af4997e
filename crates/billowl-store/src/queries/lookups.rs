// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queries for the category and payment-method lookup tables.

use billowl_core::{BillowlError, Category, PaymentMethod};

use crate::database::{Database, map_tr_err};

pub async fn insert_category(db: &Database, name: &str) -> Result<i64, BillowlError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO categories (name) VALUES (?1)",
                rusqlite::params![name],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_categories(db: &Database) -> Result<Vec<Category>, BillowlError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name ASC")?;
            let rows = stmt.query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?;
            let mut categories = Vec::new();
            for row in rows {
                categories.push(row?);
            }
            Ok(categories)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn insert_payment_method(
    db: &Database,
    name: &str,
    is_automatic: bool,
) -> Result<i64, BillowlError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO payment_methods (name, is_automatic) VALUES (?1, ?2)",
                rusqlite::params![name, is_automatic],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_payment_methods(db: &Database) -> Result<Vec<PaymentMethod>, BillowlError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, is_automatic FROM payment_methods ORDER BY name ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(PaymentMethod {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    is_automatic: row.get(2)?,
                })
            })?;
            let mut methods = Vec::new();
            for row in rows {
                methods.push(row?);
            }
            Ok(methods)
        })
        .await
        .map_err(map_tr_err)
}
