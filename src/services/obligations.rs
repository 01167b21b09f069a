//! Lifecycle of the recurring monthly tax obligation ("DAS"). Paying one
//! is what creates its expense ledger entry; unpaying removes it again.

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::date_utils;
use crate::db::queries::{ledger, obligations};
use crate::error::{AppError, AppResult};
use crate::models::{EntryKind, LinkedKind, NewLedgerEntry, NewTaxObligation, TaxObligation};
use crate::services::receipts::ReceiptUpload;
use crate::services::sync::TAX_MARKER;
use crate::state::AppState;

pub fn list_obligations(state: &AppState) -> AppResult<Vec<TaxObligation>> {
    let owner = state.require_owner()?;
    let conn = state.db.get()?;
    Ok(obligations::list_obligations(&conn, &owner)?)
}

pub fn get_obligation(state: &AppState, id: i64) -> AppResult<TaxObligation> {
    let owner = state.require_owner()?;
    let conn = state.db.get()?;
    obligations::get_obligation(&conn, &owner, id)?
        .ok_or_else(|| AppError::NotFound(format!("tax obligation {}", id)))
}

/// Explicit creation for a chosen competence period. The due date is
/// derived, never caller-supplied.
pub fn create_obligation(
    state: &AppState,
    payload: &NewTaxObligation,
) -> AppResult<TaxObligation> {
    let owner = state.require_owner()?;
    payload.validate()?;

    let due = date_utils::due_date_for(&payload.competence).ok_or_else(|| {
        AppError::Validation(format!("invalid competence period: {}", payload.competence))
    })?;

    let conn = state.db.get()?;
    if obligations::get_by_competence(&conn, &owner, &payload.competence)?.is_some() {
        return Err(AppError::Validation(format!(
            "an obligation for {} already exists",
            payload.competence
        )));
    }

    let id = obligations::create_obligation(
        &conn,
        &owner,
        &payload.competence,
        &due.format("%Y-%m-%d").to_string(),
        payload.amount_cents,
    )?;
    info!(obligation_id = id, competence = %payload.competence, "Tax obligation created");

    obligations::get_obligation(&conn, &owner, id)?
        .ok_or_else(|| AppError::Internal(format!("obligation {} missing after insert", id)))
}

/// Scheduled step: make sure the current competence period has an
/// obligation. Returns the created obligation, or `None` when one
/// already existed. Idempotent.
pub fn ensure_current_obligation(
    state: &AppState,
    amount_cents: i64,
) -> AppResult<Option<TaxObligation>> {
    let owner = state.require_owner()?;
    if amount_cents < 0 {
        return Err(AppError::Validation("amount must not be negative".into()));
    }

    let competence = date_utils::period_key(Local::now().date_naive());
    let conn = state.db.get()?;
    if obligations::get_by_competence(&conn, &owner, &competence)?.is_some() {
        return Ok(None);
    }

    let due = date_utils::due_date_for(&competence)
        .ok_or_else(|| AppError::Internal(format!("bad period key {}", competence)))?;
    let id = obligations::create_obligation(
        &conn,
        &owner,
        &competence,
        &due.format("%Y-%m-%d").to_string(),
        amount_cents,
    )?;
    info!(obligation_id = id, competence = %competence, "Ensured obligation for current period");

    Ok(obligations::get_obligation(&conn, &owner, id)?)
}

/// Transition pending → paid: the payment becomes an expense ledger
/// entry carrying the tax marker, and the two records are linked.
/// Re-marking an already-paid obligation reuses its linked entry.
pub fn mark_paid(
    state: &AppState,
    id: i64,
    payment_date: &str,
    receipt: Option<ReceiptUpload>,
) -> AppResult<TaxObligation> {
    let owner = state.require_owner()?;
    if NaiveDate::parse_from_str(payment_date, "%Y-%m-%d").is_err() {
        return Err(AppError::Validation(format!(
            "invalid payment date: {}",
            payment_date
        )));
    }

    // Upload before the store transaction; a store failure removes the
    // orphaned file again.
    let receipt_url = match receipt {
        Some(upload) => Some(state.receipts.upload(&upload.file_name, &upload.bytes)?),
        None => None,
    };

    let mut conn = state.db.get()?;
    let stored = (|| -> AppResult<i64> {
        let tx = conn.transaction()?;
        let obligation = obligations::get_obligation(&tx, &owner, id)?
            .ok_or_else(|| AppError::NotFound(format!("tax obligation {}", id)))?;

        let description = format!("{} {}", TAX_MARKER, obligation.competence_display());
        let entry_id = match obligation.ledger_entry_id {
            Some(entry_id) => {
                ledger::update_linked_entry(
                    &tx,
                    &owner,
                    entry_id,
                    payment_date,
                    obligation.amount_cents,
                    &description,
                    None,
                )?;
                entry_id
            }
            None => ledger::create_entry(
                &tx,
                &owner,
                &NewLedgerEntry {
                    kind: EntryKind::Expense,
                    date: payment_date.to_string(),
                    amount_cents: obligation.amount_cents,
                    description,
                    category: Some("Taxes".into()),
                    payment_method: None,
                },
                Some(LinkedKind::Tax),
            )?,
        };

        obligations::mark_paid(&tx, &owner, id, payment_date, entry_id, receipt_url.as_deref())?;
        tx.commit()?;
        Ok(entry_id)
    })();

    let entry_id = match stored {
        Ok(entry_id) => entry_id,
        Err(e) => {
            if let Some(url) = &receipt_url {
                if let Err(cleanup) = state.receipts.delete(url) {
                    warn!(error = %cleanup, "Failed to remove receipt after aborted payment");
                }
            }
            return Err(e);
        }
    };

    info!(obligation_id = id, entry_id = entry_id, "Tax obligation marked paid");
    obligations::get_obligation(&conn, &owner, id)?
        .ok_or_else(|| AppError::Internal(format!("obligation {} missing after payment", id)))
}

/// Transition paid → pending: the linked entry is removed and the
/// back-reference and payment date cleared.
pub fn mark_pending(state: &AppState, id: i64) -> AppResult<TaxObligation> {
    let owner = state.require_owner()?;
    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let obligation = obligations::get_obligation(&tx, &owner, id)?
        .ok_or_else(|| AppError::NotFound(format!("tax obligation {}", id)))?;

    // Clear the back-reference before deleting the entry it points at.
    obligations::mark_pending(&tx, &owner, id)?;
    if let Some(entry_id) = obligation.ledger_entry_id {
        ledger::delete_entry(&tx, &owner, entry_id)?;
    }
    tx.commit()?;

    info!(obligation_id = id, "Tax obligation reverted to pending");
    obligations::get_obligation(&conn, &owner, id)?
        .ok_or_else(|| AppError::Internal(format!("obligation {} missing after revert", id)))
}

/// Delete an obligation together with its linked entry and receipt.
pub fn delete_obligation(state: &AppState, id: i64) -> AppResult<()> {
    let owner = state.require_owner()?;
    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let obligation = obligations::get_obligation(&tx, &owner, id)?
        .ok_or_else(|| AppError::NotFound(format!("tax obligation {}", id)))?;

    obligations::delete_obligation(&tx, &owner, id)?;
    if let Some(entry_id) = obligation.ledger_entry_id {
        ledger::delete_entry(&tx, &owner, entry_id)?;
    }
    tx.commit()?;

    if let Some(url) = &obligation.receipt_url {
        if let Err(e) = state.receipts.delete(url) {
            warn!(obligation_id = id, error = %e, "Receipt cleanup failed after delete");
            return Err(AppError::PartialSync {
                action: "Tax obligation deleted".into(),
                detail: "its receipt file could not be removed".into(),
            });
        }
    }

    info!(obligation_id = id, "Tax obligation deleted");
    Ok(())
}
