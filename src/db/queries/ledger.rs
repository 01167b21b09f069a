use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, trace};

use super::invalid_text;
use crate::models::{EntryKind, LedgerEntry, LinkedKind, NewLedgerEntry};

const ENTRY_COLUMNS: &str = "id, owner_id, kind, date, amount_cents, description, \
     category, payment_method, linked_kind, created_at, updated_at";

fn map_entry(row: &Row) -> rusqlite::Result<LedgerEntry> {
    let kind: String = row.get(2)?;
    let linked: Option<String> = row.get(8)?;
    Ok(LedgerEntry {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        kind: EntryKind::parse(&kind).ok_or_else(|| invalid_text(2, &kind))?,
        date: row.get(3)?,
        amount_cents: row.get(4)?,
        description: row.get(5)?,
        category: row.get(6)?,
        payment_method: row.get(7)?,
        linked_kind: linked
            .map(|s| LinkedKind::parse(&s).ok_or_else(|| invalid_text(8, &s)))
            .transpose()?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

#[derive(Default)]
pub struct LedgerFilter {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub kind: Option<EntryKind>,
    pub search: Option<String>,
}

pub fn list_entries(
    conn: &Connection,
    owner_id: &str,
    filter: &LedgerFilter,
) -> rusqlite::Result<Vec<LedgerEntry>> {
    let mut sql = format!(
        "SELECT {} FROM ledger_entries WHERE owner_id = ?",
        ENTRY_COLUMNS
    );
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner_id.to_string())];

    if let Some(ref from_date) = filter.from_date {
        sql.push_str(" AND date >= ?");
        params_vec.push(Box::new(from_date.clone()));
    }
    if let Some(ref to_date) = filter.to_date {
        sql.push_str(" AND date <= ?");
        params_vec.push(Box::new(to_date.clone()));
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND kind = ?");
        params_vec.push(Box::new(kind.as_str()));
    }
    if let Some(ref search) = filter.search {
        sql.push_str(" AND description LIKE ?");
        params_vec.push(Box::new(format!("%{}%", search)));
    }

    sql.push_str(" ORDER BY date DESC, id DESC");

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let entries: Vec<LedgerEntry> = stmt
        .query_map(params_refs.as_slice(), map_entry)?
        .collect::<rusqlite::Result<_>>()?;

    debug!(owner = owner_id, count = entries.len(), "Listed ledger entries");
    Ok(entries)
}

pub fn get_entry(
    conn: &Connection,
    owner_id: &str,
    id: i64,
) -> rusqlite::Result<Option<LedgerEntry>> {
    trace!(entry_id = id, "Fetching ledger entry");
    conn.query_row(
        &format!(
            "SELECT {} FROM ledger_entries WHERE id = ? AND owner_id = ?",
            ENTRY_COLUMNS
        ),
        params![id, owner_id],
        map_entry,
    )
    .optional()
}

pub fn create_entry(
    conn: &Connection,
    owner_id: &str,
    entry: &NewLedgerEntry,
    linked: Option<LinkedKind>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO ledger_entries
         (owner_id, kind, date, amount_cents, description, category, payment_method, linked_kind)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            owner_id,
            entry.kind.as_str(),
            entry.date,
            entry.amount_cents,
            entry.description,
            entry.category,
            entry.payment_method,
            linked.map(|l| l.as_str()),
        ],
    )?;

    let id = conn.last_insert_rowid();
    debug!(
        entry_id = id,
        kind = entry.kind.as_str(),
        amount_cents = entry.amount_cents,
        "Created ledger entry"
    );
    Ok(id)
}

pub fn update_entry(
    conn: &Connection,
    owner_id: &str,
    id: i64,
    entry: &NewLedgerEntry,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE ledger_entries SET kind = ?, date = ?, amount_cents = ?, description = ?,
         category = ?, payment_method = ?, updated_at = datetime('now')
         WHERE id = ? AND owner_id = ?",
        params![
            entry.kind.as_str(),
            entry.date,
            entry.amount_cents,
            entry.description,
            entry.category,
            entry.payment_method,
            id,
            owner_id,
        ],
    )?;
    if rows > 0 {
        debug!(entry_id = id, "Updated ledger entry");
    }
    Ok(rows > 0)
}

/// Targeted update for entries mirrored from a derived record: the kind,
/// category, and discriminator stay as they are.
pub fn update_linked_entry(
    conn: &Connection,
    owner_id: &str,
    id: i64,
    date: &str,
    amount_cents: i64,
    description: &str,
    payment_method: Option<&str>,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE ledger_entries SET date = ?, amount_cents = ?, description = ?,
         payment_method = ?, updated_at = datetime('now')
         WHERE id = ? AND owner_id = ?",
        params![date, amount_cents, description, payment_method, id, owner_id],
    )?;
    if rows > 0 {
        debug!(entry_id = id, "Updated linked ledger entry");
    }
    Ok(rows > 0)
}

pub fn delete_entry(conn: &Connection, owner_id: &str, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "DELETE FROM ledger_entries WHERE id = ? AND owner_id = ?",
        params![id, owner_id],
    )?;
    if rows > 0 {
        debug!(entry_id = id, "Deleted ledger entry");
    }
    Ok(rows > 0)
}
