//! Keeps ledger entries and their derived records (tax payments, sales)
//! mutually consistent across update and delete. The reverse direction,
//! creating an entry on behalf of a derived record, lives in the
//! obligation and sale services.

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::db::queries::ledger::{self, LedgerFilter};
use crate::db::queries::{obligations, sales};
use crate::error::{AppError, AppResult};
use crate::models::{EntryKind, LedgerEntry, LinkedKind, NewLedgerEntry};
use crate::state::AppState;

/// Substring in an expense description that marks it tax-related. Kept
/// for rows that predate the explicit `linked_kind` column.
pub const TAX_MARKER: &str = "DAS";

/// Which derived store an entry belongs to, if any. The explicit
/// discriminator wins; the text heuristic covers legacy rows.
pub fn classify(entry: &LedgerEntry) -> Option<LinkedKind> {
    if let Some(kind) = entry.linked_kind {
        return Some(kind);
    }
    match entry.kind {
        EntryKind::Expense if entry.description.contains(TAX_MARKER) => Some(LinkedKind::Tax),
        EntryKind::Income => Some(LinkedKind::Sale),
        _ => None,
    }
}

pub fn list_entries(state: &AppState, filter: &LedgerFilter) -> AppResult<Vec<LedgerEntry>> {
    let owner = state.require_owner()?;
    let conn = state.db.get()?;
    Ok(ledger::list_entries(&conn, &owner, filter)?)
}

pub fn get_entry(state: &AppState, id: i64) -> AppResult<LedgerEntry> {
    let owner = state.require_owner()?;
    let conn = state.db.get()?;
    ledger::get_entry(&conn, &owner, id)?
        .ok_or_else(|| AppError::NotFound(format!("ledger entry {}", id)))
}

/// Insert a user-entered ledger entry. Derived records are never created
/// from this direction.
pub fn create_entry(state: &AppState, payload: &NewLedgerEntry) -> AppResult<LedgerEntry> {
    let owner = state.require_owner()?;
    payload.validate()?;

    let conn = state.db.get()?;
    let id = ledger::create_entry(&conn, &owner, payload, None)?;
    info!(entry_id = id, "Ledger entry created");

    ledger::get_entry(&conn, &owner, id)?
        .ok_or_else(|| AppError::Internal(format!("entry {} missing after insert", id)))
}

/// Update a ledger entry and mirror changed values into its derived
/// record, all in one transaction.
pub fn update_entry(state: &AppState, id: i64, payload: &NewLedgerEntry) -> AppResult<()> {
    let owner = state.require_owner()?;
    payload.validate()?;

    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    if ledger::get_entry(&tx, &owner, id)?.is_none() {
        return Err(AppError::NotFound(format!("ledger entry {}", id)));
    }
    ledger::update_entry(&tx, &owner, id, payload)?;
    let after = ledger::get_entry(&tx, &owner, id)?
        .ok_or_else(|| AppError::Internal(format!("entry {} missing after update", id)))?;

    match classify(&after) {
        Some(LinkedKind::Tax) => propagate_to_obligation(&tx, &owner, &after)?,
        Some(LinkedKind::Sale) => propagate_to_sale(&tx, &owner, &after)?,
        None => {}
    }

    tx.commit()?;
    info!(entry_id = id, "Ledger entry updated");
    Ok(())
}

/// Delete a ledger entry; a linked tax payment or sale goes with it.
pub fn delete_entry(state: &AppState, id: i64) -> AppResult<()> {
    let owner = state.require_owner()?;
    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let entry = ledger::get_entry(&tx, &owner, id)?
        .ok_or_else(|| AppError::NotFound(format!("ledger entry {}", id)))?;

    let mut receipt_url = None;
    match classify(&entry) {
        Some(LinkedKind::Tax) => {
            if let Some(obligation) = obligations::find_by_entry(&tx, &owner, id)? {
                receipt_url = obligation.receipt_url.clone();
                obligations::delete_obligation(&tx, &owner, obligation.id)?;
                info!(
                    obligation_id = obligation.id,
                    entry_id = id,
                    "Deleted tax payment linked to entry"
                );
            }
        }
        Some(LinkedKind::Sale) => {
            if let Some(sale) = sales::find_by_entry(&tx, &owner, id)? {
                receipt_url = sale.receipt_url.clone();
                sales::delete_sale(&tx, &owner, sale.id)?;
                info!(sale_id = sale.id, entry_id = id, "Deleted sale linked to entry");
            }
        }
        None => {}
    }

    ledger::delete_entry(&tx, &owner, id)?;
    tx.commit()?;

    // Delete contract: nothing may reference the id afterwards.
    let stale = obligations::count_referencing_entry(&conn, &owner, id)?
        + sales::count_referencing_entry(&conn, &owner, id)?;
    if stale > 0 {
        warn!(entry_id = id, stale = stale, "Derived records still reference a deleted entry");
        return Err(AppError::PartialSync {
            action: "Transaction deleted".into(),
            detail: "a linked record still references it".into(),
        });
    }

    if let Some(url) = receipt_url {
        if let Err(e) = state.receipts.delete(&url) {
            warn!(entry_id = id, error = %e, "Receipt cleanup failed after delete");
            return Err(AppError::PartialSync {
                action: "Transaction deleted".into(),
                detail: "its receipt file could not be removed".into(),
            });
        }
    }

    info!(entry_id = id, "Ledger entry deleted");
    Ok(())
}

/// Mirror entry values into the linked tax payment. Only fields whose
/// stored value actually differs are written.
fn propagate_to_obligation(conn: &Connection, owner: &str, entry: &LedgerEntry) -> AppResult<()> {
    let Some(obligation) = obligations::find_by_entry(conn, owner, entry.id)? else {
        return Ok(());
    };

    if entry.amount_cents != obligation.amount_cents {
        obligations::set_amount(conn, owner, obligation.id, entry.amount_cents)?;
        debug!(
            obligation_id = obligation.id,
            amount_cents = entry.amount_cents,
            "Propagated amount to tax payment"
        );
    }
    if obligation.payment_date.as_deref() != Some(entry.date.as_str()) {
        obligations::set_payment_date(conn, owner, obligation.id, &entry.date)?;
        debug!(
            obligation_id = obligation.id,
            date = %entry.date,
            "Propagated payment date to tax payment"
        );
    }
    Ok(())
}

/// Mirror entry values into the linked sale; same changed-field rule.
fn propagate_to_sale(conn: &Connection, owner: &str, entry: &LedgerEntry) -> AppResult<()> {
    let Some(sale) = sales::find_by_entry(conn, owner, entry.id)? else {
        return Ok(());
    };

    if entry.amount_cents != sale.amount_cents {
        sales::set_amount(conn, owner, sale.id, entry.amount_cents)?;
        debug!(sale_id = sale.id, amount_cents = entry.amount_cents, "Propagated amount to sale");
    }
    if entry.date != sale.date {
        sales::set_date(conn, owner, sale.id, &entry.date)?;
        debug!(sale_id = sale.id, date = %entry.date, "Propagated date to sale");
    }
    if entry.description != sale.description {
        sales::set_description(conn, owner, sale.id, &entry.description)?;
        debug!(sale_id = sale.id, "Propagated description to sale");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: EntryKind, description: &str, linked_kind: Option<LinkedKind>) -> LedgerEntry {
        LedgerEntry {
            id: 1,
            owner_id: "owner-1".into(),
            kind,
            date: "2026-08-01".into(),
            amount_cents: 1000,
            description: description.into(),
            category: None,
            payment_method: None,
            linked_kind,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn expense_with_marker_is_tax_related() {
        let e = entry(EntryKind::Expense, "DAS 07/2026", None);
        assert_eq!(classify(&e), Some(LinkedKind::Tax));
    }

    #[test]
    fn expense_without_marker_is_unclassified() {
        let e = entry(EntryKind::Expense, "Office rent", None);
        assert_eq!(classify(&e), None);
    }

    #[test]
    fn income_is_sale_related() {
        let e = entry(EntryKind::Income, "Consulting", None);
        assert_eq!(classify(&e), Some(LinkedKind::Sale));
    }

    #[test]
    fn explicit_discriminator_beats_the_heuristic() {
        // A tax entry whose description was edited away from the marker
        // still classifies as tax.
        let e = entry(EntryKind::Expense, "monthly tax payment", Some(LinkedKind::Tax));
        assert_eq!(classify(&e), Some(LinkedKind::Tax));
    }
}
