//! Integration tests for ledger/derived-record synchronization.

mod common;

use common::{TestContext, OWNER};
use tally::db::queries::{ledger, obligations, sales};
use tally::error::AppError;
use tally::models::{EntryKind, NewLedgerEntry};
use tally::services::{obligations as obligation_service, sales as sale_service, sync};

/// Deleting a tax-marked expense entry linked to an obligation deletes
/// the obligation as well, not just the link.
#[test]
fn delete_entry_cascades_to_obligation() {
    let ctx = TestContext::new();
    let id = ctx.insert_obligation("2026-07", "2026-08-20", 7500);
    let obligation = obligation_service::mark_paid(&ctx.state, id, "2026-08-18", None).unwrap();
    let entry_id = obligation.ledger_entry_id.unwrap();

    sync::delete_entry(&ctx.state, entry_id).unwrap();

    let conn = ctx.state.db.get().unwrap();
    assert!(obligations::get_obligation(&conn, OWNER, id).unwrap().is_none());
    assert!(ledger::get_entry(&conn, OWNER, entry_id).unwrap().is_none());
    assert_eq!(
        obligations::count_referencing_entry(&conn, OWNER, entry_id).unwrap(),
        0
    );
}

/// Deleting a sale's income entry deletes the sale as well.
#[test]
fn delete_entry_cascades_to_sale() {
    let ctx = TestContext::new();
    let sale =
        sale_service::create_sale(&ctx.state, &TestContext::new_sale("2026-08-01", 12000, "Consulting"), None)
            .unwrap();
    let entry_id = sale.ledger_entry_id.unwrap();

    sync::delete_entry(&ctx.state, entry_id).unwrap();

    let conn = ctx.state.db.get().unwrap();
    assert!(sales::get_sale(&conn, OWNER, sale.id).unwrap().is_none());
    assert!(ledger::get_entry(&conn, OWNER, entry_id).unwrap().is_none());
}

/// Deleting an unlinked entry touches nothing else.
#[test]
fn delete_plain_entry_leaves_other_records_alone() {
    let ctx = TestContext::new();
    let entry = sync::create_entry(
        &ctx.state,
        &TestContext::new_entry(EntryKind::Expense, "2026-08-02", 4500, "Office rent"),
    )
    .unwrap();
    let other =
        sale_service::create_sale(&ctx.state, &TestContext::new_sale("2026-08-03", 9000, "Workshop"), None)
            .unwrap();

    sync::delete_entry(&ctx.state, entry.id).unwrap();

    let conn = ctx.state.db.get().unwrap();
    assert!(ledger::get_entry(&conn, OWNER, entry.id).unwrap().is_none());
    assert!(sales::get_sale(&conn, OWNER, other.id).unwrap().is_some());
}

/// Updating a linked entry's amount propagates to the sale without
/// touching a description that did not change.
#[test]
fn update_amount_propagates_to_sale_and_keeps_description() {
    let ctx = TestContext::new();
    let sale = sale_service::create_sale(
        &ctx.state,
        &TestContext::new_sale("2026-08-01", 10000, "Consulting session"),
        None,
    )
    .unwrap();
    let entry_id = sale.ledger_entry_id.unwrap();

    let payload = NewLedgerEntry {
        kind: EntryKind::Income,
        date: "2026-08-01".into(),
        amount_cents: 15000,
        description: "Consulting session".into(),
        category: Some("Sales".into()),
        payment_method: Some("pix".into()),
    };
    sync::update_entry(&ctx.state, entry_id, &payload).unwrap();

    let conn = ctx.state.db.get().unwrap();
    let updated = sales::get_sale(&conn, OWNER, sale.id).unwrap().unwrap();
    assert_eq!(updated.amount_cents, 15000);
    assert_eq!(updated.description, "Consulting session");
    assert_eq!(updated.date, "2026-08-01");
}

/// Updating a tax entry's amount and date lands on the obligation's
/// amount and payment date.
#[test]
fn update_tax_entry_propagates_amount_and_payment_date() {
    let ctx = TestContext::new();
    let id = ctx.insert_obligation("2026-06", "2026-07-20", 7100);
    let obligation = obligation_service::mark_paid(&ctx.state, id, "2026-07-15", None).unwrap();
    let entry_id = obligation.ledger_entry_id.unwrap();

    let payload = NewLedgerEntry {
        kind: EntryKind::Expense,
        date: "2026-07-18".into(),
        amount_cents: 7300,
        description: "DAS 06/2026".into(),
        category: Some("Taxes".into()),
        payment_method: None,
    };
    sync::update_entry(&ctx.state, entry_id, &payload).unwrap();

    let conn = ctx.state.db.get().unwrap();
    let updated = obligations::get_obligation(&conn, OWNER, id).unwrap().unwrap();
    assert_eq!(updated.amount_cents, 7300);
    assert_eq!(updated.payment_date.as_deref(), Some("2026-07-18"));
}

/// Editing the marker out of a tax entry's description must not detach
/// propagation; the stored discriminator keeps the link.
#[test]
fn propagation_survives_description_losing_the_marker() {
    let ctx = TestContext::new();
    let id = ctx.insert_obligation("2026-05", "2026-06-20", 7100);
    let obligation = obligation_service::mark_paid(&ctx.state, id, "2026-06-10", None).unwrap();
    let entry_id = obligation.ledger_entry_id.unwrap();

    let payload = NewLedgerEntry {
        kind: EntryKind::Expense,
        date: "2026-06-10".into(),
        amount_cents: 7600,
        description: "monthly federal tax".into(),
        category: Some("Taxes".into()),
        payment_method: None,
    };
    sync::update_entry(&ctx.state, entry_id, &payload).unwrap();

    let conn = ctx.state.db.get().unwrap();
    let updated = obligations::get_obligation(&conn, OWNER, id).unwrap().unwrap();
    assert_eq!(updated.amount_cents, 7600);
}

/// Back-references always point at an existing entry of the same owner.
#[test]
fn back_references_resolve_to_owned_entries() {
    let ctx = TestContext::new();
    let obligation_id = ctx.insert_obligation("2026-07", "2026-08-20", 7500);
    obligation_service::mark_paid(&ctx.state, obligation_id, "2026-08-10", None).unwrap();
    sale_service::create_sale(&ctx.state, &TestContext::new_sale("2026-08-04", 5000, "Repair"), None)
        .unwrap();

    let conn = ctx.state.db.get().unwrap();
    for obligation in obligations::list_obligations(&conn, OWNER).unwrap() {
        if let Some(entry_id) = obligation.ledger_entry_id {
            let entry = ledger::get_entry(&conn, OWNER, entry_id).unwrap().unwrap();
            assert_eq!(entry.owner_id, OWNER);
        }
    }
    for sale in sales::list_sales(&conn, OWNER).unwrap() {
        if let Some(entry_id) = sale.ledger_entry_id {
            let entry = ledger::get_entry(&conn, OWNER, entry_id).unwrap().unwrap();
            assert_eq!(entry.owner_id, OWNER);
        }
    }
}

/// Every operation is owner-scoped; records of another owner are invisible.
#[test]
fn entries_of_other_owners_are_not_found() {
    let ctx = TestContext::new();
    let entry = sync::create_entry(
        &ctx.state,
        &TestContext::new_entry(EntryKind::Income, "2026-08-01", 1000, "Misc"),
    )
    .unwrap();

    let conn = ctx.state.db.get().unwrap();
    assert!(ledger::get_entry(&conn, "someone-else", entry.id).unwrap().is_none());
}

/// All mutating operations short-circuit when signed out.
#[test]
fn operations_require_authentication() {
    let ctx = TestContext::new();
    ctx.sign_out();

    let result = sync::create_entry(
        &ctx.state,
        &TestContext::new_entry(EntryKind::Income, "2026-08-01", 1000, "Misc"),
    );
    assert!(matches!(result, Err(AppError::NotAuthenticated)));

    let result = sync::delete_entry(&ctx.state, 1);
    assert!(matches!(result, Err(AppError::NotAuthenticated)));
}

/// Negative amounts are rejected before anything is written.
#[test]
fn negative_amounts_are_rejected() {
    let ctx = TestContext::new();
    let result = sync::create_entry(
        &ctx.state,
        &TestContext::new_entry(EntryKind::Expense, "2026-08-01", -500, "Bad"),
    );
    assert!(matches!(result, Err(AppError::Validation(_))));
}
