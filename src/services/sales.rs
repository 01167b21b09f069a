//! Sales mirror into the ledger: each sale is backed by exactly one
//! income entry, created, updated, and deleted in lockstep with it.

use tracing::{info, warn};

use crate::db::queries::{ledger, sales};
use crate::error::{AppError, AppResult};
use crate::models::{EntryKind, LinkedKind, NewLedgerEntry, NewSale, SaleRecord};
use crate::services::receipts::ReceiptUpload;
use crate::state::AppState;

pub fn list_sales(state: &AppState) -> AppResult<Vec<SaleRecord>> {
    let owner = state.require_owner()?;
    let conn = state.db.get()?;
    Ok(sales::list_sales(&conn, &owner)?)
}

pub fn get_sale(state: &AppState, id: i64) -> AppResult<SaleRecord> {
    let owner = state.require_owner()?;
    let conn = state.db.get()?;
    sales::get_sale(&conn, &owner, id)?
        .ok_or_else(|| AppError::NotFound(format!("sale {}", id)))
}

/// Create the income ledger entry and the sale referencing it in one
/// transaction.
pub fn create_sale(
    state: &AppState,
    payload: &NewSale,
    receipt: Option<ReceiptUpload>,
) -> AppResult<SaleRecord> {
    let owner = state.require_owner()?;
    payload.validate()?;

    let receipt_url = match receipt {
        Some(upload) => Some(state.receipts.upload(&upload.file_name, &upload.bytes)?),
        None => None,
    };

    let mut conn = state.db.get()?;
    let stored = (|| -> AppResult<i64> {
        let tx = conn.transaction()?;
        let entry_id = ledger::create_entry(
            &tx,
            &owner,
            &NewLedgerEntry {
                kind: EntryKind::Income,
                date: payload.date.clone(),
                amount_cents: payload.amount_cents,
                description: payload.description.clone(),
                category: Some("Sales".into()),
                payment_method: payload.payment_method.clone(),
            },
            Some(LinkedKind::Sale),
        )?;
        let id = sales::create_sale(&tx, &owner, payload, entry_id, receipt_url.as_deref())?;
        tx.commit()?;
        Ok(id)
    })();

    let id = match stored {
        Ok(id) => id,
        Err(e) => {
            if let Some(url) = &receipt_url {
                if let Err(cleanup) = state.receipts.delete(url) {
                    warn!(error = %cleanup, "Failed to remove receipt after aborted sale");
                }
            }
            return Err(e);
        }
    };

    info!(sale_id = id, "Sale created");
    sales::get_sale(&conn, &owner, id)?
        .ok_or_else(|| AppError::Internal(format!("sale {} missing after insert", id)))
}

/// Update a sale and its linked entry in lockstep.
pub fn update_sale(state: &AppState, id: i64, payload: &NewSale) -> AppResult<SaleRecord> {
    let owner = state.require_owner()?;
    payload.validate()?;

    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let sale = sales::get_sale(&tx, &owner, id)?
        .ok_or_else(|| AppError::NotFound(format!("sale {}", id)))?;

    sales::update_sale(&tx, &owner, id, payload)?;
    if let Some(entry_id) = sale.ledger_entry_id {
        ledger::update_linked_entry(
            &tx,
            &owner,
            entry_id,
            &payload.date,
            payload.amount_cents,
            &payload.description,
            payload.payment_method.as_deref(),
        )?;
    }
    tx.commit()?;

    info!(sale_id = id, "Sale updated");
    sales::get_sale(&conn, &owner, id)?
        .ok_or_else(|| AppError::Internal(format!("sale {} missing after update", id)))
}

/// Delete a sale and its linked entry together; receipt cleanup follows
/// the commit.
pub fn delete_sale(state: &AppState, id: i64) -> AppResult<()> {
    let owner = state.require_owner()?;
    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let sale = sales::get_sale(&tx, &owner, id)?
        .ok_or_else(|| AppError::NotFound(format!("sale {}", id)))?;

    sales::delete_sale(&tx, &owner, id)?;
    if let Some(entry_id) = sale.ledger_entry_id {
        ledger::delete_entry(&tx, &owner, entry_id)?;
    }
    tx.commit()?;

    if let Some(url) = &sale.receipt_url {
        if let Err(e) = state.receipts.delete(url) {
            warn!(sale_id = id, error = %e, "Receipt cleanup failed after delete");
            return Err(AppError::PartialSync {
                action: "Sale deleted".into(),
                detail: "its receipt file could not be removed".into(),
            });
        }
    }

    info!(sale_id = id, "Sale deleted");
    Ok(())
}
