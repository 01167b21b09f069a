use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, trace};

use super::invalid_text;
use crate::models::{ObligationStatus, TaxObligation};

const OBLIGATION_COLUMNS: &str = "id, owner_id, competence, due_date, amount_cents, status, \
     payment_date, receipt_url, ledger_entry_id, created_at, updated_at";

fn map_obligation(row: &Row) -> rusqlite::Result<TaxObligation> {
    let status: String = row.get(5)?;
    Ok(TaxObligation {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        competence: row.get(2)?,
        due_date: row.get(3)?,
        amount_cents: row.get(4)?,
        status: ObligationStatus::parse(&status).ok_or_else(|| invalid_text(5, &status))?,
        payment_date: row.get(6)?,
        receipt_url: row.get(7)?,
        ledger_entry_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub fn list_obligations(conn: &Connection, owner_id: &str) -> rusqlite::Result<Vec<TaxObligation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM tax_obligations WHERE owner_id = ? ORDER BY competence DESC",
        OBLIGATION_COLUMNS
    ))?;
    let obligations: Vec<TaxObligation> = stmt
        .query_map([owner_id], map_obligation)?
        .collect::<rusqlite::Result<_>>()?;

    debug!(owner = owner_id, count = obligations.len(), "Listed tax obligations");
    Ok(obligations)
}

pub fn get_obligation(
    conn: &Connection,
    owner_id: &str,
    id: i64,
) -> rusqlite::Result<Option<TaxObligation>> {
    trace!(obligation_id = id, "Fetching tax obligation");
    conn.query_row(
        &format!(
            "SELECT {} FROM tax_obligations WHERE id = ? AND owner_id = ?",
            OBLIGATION_COLUMNS
        ),
        params![id, owner_id],
        map_obligation,
    )
    .optional()
}

pub fn get_by_competence(
    conn: &Connection,
    owner_id: &str,
    competence: &str,
) -> rusqlite::Result<Option<TaxObligation>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM tax_obligations WHERE owner_id = ? AND competence = ?",
            OBLIGATION_COLUMNS
        ),
        params![owner_id, competence],
        map_obligation,
    )
    .optional()
}

/// The obligation whose back-reference points at a ledger entry, if any.
pub fn find_by_entry(
    conn: &Connection,
    owner_id: &str,
    entry_id: i64,
) -> rusqlite::Result<Option<TaxObligation>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM tax_obligations WHERE owner_id = ? AND ledger_entry_id = ?",
            OBLIGATION_COLUMNS
        ),
        params![owner_id, entry_id],
        map_obligation,
    )
    .optional()
}

pub fn list_pending_due_on_or_after(
    conn: &Connection,
    owner_id: &str,
    date: &str,
) -> rusqlite::Result<Vec<TaxObligation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM tax_obligations
         WHERE owner_id = ? AND status = 'pending' AND due_date >= ?
         ORDER BY due_date",
        OBLIGATION_COLUMNS
    ))?;
    let obligations: Vec<TaxObligation> = stmt
        .query_map(params![owner_id, date], map_obligation)?
        .collect::<rusqlite::Result<_>>()?;
    Ok(obligations)
}

pub fn create_obligation(
    conn: &Connection,
    owner_id: &str,
    competence: &str,
    due_date: &str,
    amount_cents: i64,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO tax_obligations (owner_id, competence, due_date, amount_cents)
         VALUES (?, ?, ?, ?)",
        params![owner_id, competence, due_date, amount_cents],
    )?;

    let id = conn.last_insert_rowid();
    debug!(obligation_id = id, competence = competence, "Created tax obligation");
    Ok(id)
}

pub fn set_amount(
    conn: &Connection,
    owner_id: &str,
    id: i64,
    amount_cents: i64,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE tax_obligations SET amount_cents = ?, updated_at = datetime('now')
         WHERE id = ? AND owner_id = ?",
        params![amount_cents, id, owner_id],
    )?;
    Ok(rows > 0)
}

pub fn set_payment_date(
    conn: &Connection,
    owner_id: &str,
    id: i64,
    payment_date: &str,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE tax_obligations SET payment_date = ?, updated_at = datetime('now')
         WHERE id = ? AND owner_id = ?",
        params![payment_date, id, owner_id],
    )?;
    Ok(rows > 0)
}

pub fn mark_paid(
    conn: &Connection,
    owner_id: &str,
    id: i64,
    payment_date: &str,
    entry_id: i64,
    receipt_url: Option<&str>,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE tax_obligations SET status = 'paid', payment_date = ?, ledger_entry_id = ?,
         receipt_url = COALESCE(?, receipt_url), updated_at = datetime('now')
         WHERE id = ? AND owner_id = ?",
        params![payment_date, entry_id, receipt_url, id, owner_id],
    )?;
    Ok(rows > 0)
}

pub fn mark_pending(conn: &Connection, owner_id: &str, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE tax_obligations SET status = 'pending', payment_date = NULL,
         ledger_entry_id = NULL, updated_at = datetime('now')
         WHERE id = ? AND owner_id = ?",
        params![id, owner_id],
    )?;
    Ok(rows > 0)
}

pub fn delete_obligation(conn: &Connection, owner_id: &str, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "DELETE FROM tax_obligations WHERE id = ? AND owner_id = ?",
        params![id, owner_id],
    )?;
    if rows > 0 {
        debug!(obligation_id = id, "Deleted tax obligation");
    }
    Ok(rows > 0)
}

pub fn count_referencing_entry(
    conn: &Connection,
    owner_id: &str,
    entry_id: i64,
) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM tax_obligations WHERE owner_id = ? AND ledger_entry_id = ?",
        params![owner_id, entry_id],
        |row| row.get(0),
    )
}
