use chrono::{Local, SecondsFormat};
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::checkout::{total_units, TransactionRecord};
use crate::util::parse_naira;

/// Aggregates over the recorded sales, shown on the reports screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistorySummary {
    pub transactions: i64,
    pub revenue: f64,
    pub average: f64,
}

/// Durable sales history. Completed transactions land here (never the
/// cancelled ones) together with their line items.
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    pub fn new() -> Result<Self> {
        let db_path =
            AppDirs::history_db_path().unwrap_or_else(|| PathBuf::from("till_history.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                receipt_number TEXT NOT NULL UNIQUE,
                customer_id TEXT NOT NULL,
                customer_name TEXT NOT NULL,
                cashier TEXT NOT NULL,
                subtotal REAL NOT NULL,
                discount_amount REAL NOT NULL,
                discount_label TEXT NOT NULL,
                total REAL NOT NULL,
                total_items INTEGER NOT NULL,
                product_count INTEGER NOT NULL,
                emitted_at TEXT NOT NULL,
                completed_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS transaction_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                receipt_number TEXT NOT NULL,
                product_name TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                line_total REAL NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_transactions_completed_at ON transactions(completed_at)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_items_receipt ON transaction_items(receipt_number)",
            [],
        )?;

        Ok(HistoryDb { conn })
    }

    /// Records a completed transaction and its items in one transaction.
    pub fn record(
        &mut self,
        record: &TransactionRecord,
        receipt_number: &str,
        cashier: &str,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO transactions
            (receipt_number, customer_id, customer_name, cashier, subtotal,
             discount_amount, discount_label, total, total_items, product_count,
             emitted_at, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                receipt_number,
                record.customer_id,
                record.customer_name,
                cashier,
                parse_naira(&record.subtotal),
                record.discount.amount,
                record.discount.label,
                parse_naira(&record.total),
                total_units(record) as i64,
                record.items.len() as i64,
                record.timestamp,
                Local::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            ],
        )?;

        for item in &record.items {
            tx.execute(
                r#"
                INSERT INTO transaction_items
                (receipt_number, product_name, quantity, line_total)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    receipt_number,
                    item.product_name,
                    item.quantity,
                    parse_naira(&item.total),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn summary(&self) -> Result<HistorySummary> {
        let (transactions, revenue): (i64, f64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(total), 0.0) FROM transactions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let average = if transactions > 0 {
            revenue / transactions as f64
        } else {
            0.0
        };

        Ok(HistorySummary {
            transactions,
            revenue,
            average,
        })
    }

    /// Units and revenue per product, best sellers first.
    pub fn units_by_product(&self) -> Result<Vec<(String, i64, f64)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT product_name, SUM(quantity), SUM(line_total)
            FROM transaction_items
            GROUP BY product_name
            ORDER BY SUM(quantity) DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Transactions and takings per cashier, top takers first.
    pub fn sales_by_cashier(&self) -> Result<Vec<(String, i64, f64)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT cashier, COUNT(*), SUM(total)
            FROM transactions
            GROUP BY cashier
            ORDER BY SUM(total) DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}
