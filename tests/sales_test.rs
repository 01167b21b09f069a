//! Integration tests for the sale lifecycle.

mod common;

use common::{TestContext, OWNER};
use tally::db::queries::{ledger, sales};
use tally::error::AppError;
use tally::models::{EntryKind, LinkedKind, NewSale};
use tally::services::sales as sale_service;

/// A sale and its income entry come into existence together, linked.
#[test]
fn create_sale_creates_linked_income_entry() {
    let ctx = TestContext::new();
    let sale = sale_service::create_sale(
        &ctx.state,
        &TestContext::new_sale("2026-08-05", 25000, "Website build"),
        None,
    )
    .unwrap();

    let entry_id = sale.ledger_entry_id.expect("sale must link an entry");
    let conn = ctx.state.db.get().unwrap();
    let entry = ledger::get_entry(&conn, OWNER, entry_id).unwrap().unwrap();
    assert_eq!(entry.kind, EntryKind::Income);
    assert_eq!(entry.amount_cents, 25000);
    assert_eq!(entry.description, "Website build");
    assert_eq!(entry.linked_kind, Some(LinkedKind::Sale));
}

/// Updating a sale updates its linked entry in lockstep.
#[test]
fn update_sale_updates_linked_entry() {
    let ctx = TestContext::new();
    let sale = sale_service::create_sale(
        &ctx.state,
        &TestContext::new_sale("2026-08-05", 25000, "Website build"),
        None,
    )
    .unwrap();

    let updated = sale_service::update_sale(
        &ctx.state,
        sale.id,
        &NewSale {
            date: "2026-08-06".into(),
            description: "Website build and hosting".into(),
            amount_cents: 30000,
            payment_method: Some("card".into()),
            customer: Some("Acme".into()),
        },
    )
    .unwrap();
    assert_eq!(updated.amount_cents, 30000);

    let conn = ctx.state.db.get().unwrap();
    let entry = ledger::get_entry(&conn, OWNER, sale.ledger_entry_id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(entry.date, "2026-08-06");
    assert_eq!(entry.amount_cents, 30000);
    assert_eq!(entry.description, "Website build and hosting");
    assert_eq!(entry.payment_method.as_deref(), Some("card"));
}

/// Deleting a sale removes both sides of the pair.
#[test]
fn delete_sale_removes_linked_entry() {
    let ctx = TestContext::new();
    let sale = sale_service::create_sale(
        &ctx.state,
        &TestContext::new_sale("2026-08-05", 25000, "Website build"),
        None,
    )
    .unwrap();
    let entry_id = sale.ledger_entry_id.unwrap();

    sale_service::delete_sale(&ctx.state, sale.id).unwrap();

    let conn = ctx.state.db.get().unwrap();
    assert!(sales::get_sale(&conn, OWNER, sale.id).unwrap().is_none());
    assert!(ledger::get_entry(&conn, OWNER, entry_id).unwrap().is_none());
}

/// Sales require a signed-in owner and a valid payload.
#[test]
fn create_sale_validates_input_and_identity() {
    let ctx = TestContext::new();

    let result = sale_service::create_sale(
        &ctx.state,
        &TestContext::new_sale("not-a-date", 1000, "Bad date"),
        None,
    );
    assert!(matches!(result, Err(AppError::Validation(_))));

    ctx.sign_out();
    let result = sale_service::create_sale(
        &ctx.state,
        &TestContext::new_sale("2026-08-05", 1000, "Signed out"),
        None,
    );
    assert!(matches!(result, Err(AppError::NotAuthenticated)));
}
