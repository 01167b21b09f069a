use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, trace};

use crate::models::{NewSale, SaleRecord};

const SALE_COLUMNS: &str = "id, owner_id, date, description, amount_cents, payment_method, \
     customer, receipt_url, ledger_entry_id, created_at, updated_at";

fn map_sale(row: &Row) -> rusqlite::Result<SaleRecord> {
    Ok(SaleRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        date: row.get(2)?,
        description: row.get(3)?,
        amount_cents: row.get(4)?,
        payment_method: row.get(5)?,
        customer: row.get(6)?,
        receipt_url: row.get(7)?,
        ledger_entry_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub fn list_sales(conn: &Connection, owner_id: &str) -> rusqlite::Result<Vec<SaleRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sales WHERE owner_id = ? ORDER BY date DESC, id DESC",
        SALE_COLUMNS
    ))?;
    let sales: Vec<SaleRecord> = stmt
        .query_map([owner_id], map_sale)?
        .collect::<rusqlite::Result<_>>()?;

    debug!(owner = owner_id, count = sales.len(), "Listed sales");
    Ok(sales)
}

pub fn get_sale(conn: &Connection, owner_id: &str, id: i64) -> rusqlite::Result<Option<SaleRecord>> {
    trace!(sale_id = id, "Fetching sale");
    conn.query_row(
        &format!("SELECT {} FROM sales WHERE id = ? AND owner_id = ?", SALE_COLUMNS),
        params![id, owner_id],
        map_sale,
    )
    .optional()
}

/// The sale whose back-reference points at a ledger entry, if any.
pub fn find_by_entry(
    conn: &Connection,
    owner_id: &str,
    entry_id: i64,
) -> rusqlite::Result<Option<SaleRecord>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM sales WHERE owner_id = ? AND ledger_entry_id = ?",
            SALE_COLUMNS
        ),
        params![owner_id, entry_id],
        map_sale,
    )
    .optional()
}

pub fn create_sale(
    conn: &Connection,
    owner_id: &str,
    sale: &NewSale,
    entry_id: i64,
    receipt_url: Option<&str>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO sales
         (owner_id, date, description, amount_cents, payment_method, customer, receipt_url, ledger_entry_id)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            owner_id,
            sale.date,
            sale.description,
            sale.amount_cents,
            sale.payment_method,
            sale.customer,
            receipt_url,
            entry_id,
        ],
    )?;

    let id = conn.last_insert_rowid();
    debug!(sale_id = id, amount_cents = sale.amount_cents, "Created sale");
    Ok(id)
}

pub fn update_sale(
    conn: &Connection,
    owner_id: &str,
    id: i64,
    sale: &NewSale,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE sales SET date = ?, description = ?, amount_cents = ?, payment_method = ?,
         customer = ?, updated_at = datetime('now')
         WHERE id = ? AND owner_id = ?",
        params![
            sale.date,
            sale.description,
            sale.amount_cents,
            sale.payment_method,
            sale.customer,
            id,
            owner_id,
        ],
    )?;
    if rows > 0 {
        debug!(sale_id = id, "Updated sale");
    }
    Ok(rows > 0)
}

pub fn set_amount(
    conn: &Connection,
    owner_id: &str,
    id: i64,
    amount_cents: i64,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE sales SET amount_cents = ?, updated_at = datetime('now')
         WHERE id = ? AND owner_id = ?",
        params![amount_cents, id, owner_id],
    )?;
    Ok(rows > 0)
}

pub fn set_date(conn: &Connection, owner_id: &str, id: i64, date: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE sales SET date = ?, updated_at = datetime('now') WHERE id = ? AND owner_id = ?",
        params![date, id, owner_id],
    )?;
    Ok(rows > 0)
}

pub fn set_description(
    conn: &Connection,
    owner_id: &str,
    id: i64,
    description: &str,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE sales SET description = ?, updated_at = datetime('now')
         WHERE id = ? AND owner_id = ?",
        params![description, id, owner_id],
    )?;
    Ok(rows > 0)
}

pub fn delete_sale(conn: &Connection, owner_id: &str, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "DELETE FROM sales WHERE id = ? AND owner_id = ?",
        params![id, owner_id],
    )?;
    if rows > 0 {
        debug!(sale_id = id, "Deleted sale");
    }
    Ok(rows > 0)
}

pub fn count_referencing_entry(
    conn: &Connection,
    owner_id: &str,
    entry_id: i64,
) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM sales WHERE owner_id = ? AND ledger_entry_id = ?",
        params![owner_id, entry_id],
        |row| row.get(0),
    )
}
