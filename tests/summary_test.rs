//! Integration tests for period summaries.

mod common;

use chrono::Local;
use common::TestContext;
use tally::models::EntryKind;
use tally::services::summary::{summarize, SummaryPeriod};
use tally::services::sync;

fn today_str() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Three entries in the current month: income 1500.00 + 2000.00,
/// expense 800.00 — income 3500.00, expense 800.00, balance 2700.00.
#[test]
fn month_summary_totals_income_expense_and_balance() {
    let ctx = TestContext::new();
    let today = today_str();
    for (kind, cents, description) in [
        (EntryKind::Income, 150_000, "Invoice A"),
        (EntryKind::Expense, 80_000, "Supplies"),
        (EntryKind::Income, 200_000, "Invoice B"),
    ] {
        sync::create_entry(&ctx.state, &TestContext::new_entry(kind, &today, cents, description))
            .unwrap();
    }

    let summary = summarize(&ctx.state, SummaryPeriod::Month);
    assert_eq!(summary.income_cents, 350_000);
    assert_eq!(summary.expense_cents, 80_000);
    assert_eq!(summary.balance_cents, 270_000);
    assert_eq!(summary.entries.len(), 3);
}

/// Entries outside the current month stay out of the month summary.
#[test]
fn month_summary_excludes_other_periods() {
    let ctx = TestContext::new();
    sync::create_entry(
        &ctx.state,
        &TestContext::new_entry(EntryKind::Income, "2000-01-15", 99_000, "Ancient invoice"),
    )
    .unwrap();
    sync::create_entry(
        &ctx.state,
        &TestContext::new_entry(EntryKind::Income, &today_str(), 10_000, "Current invoice"),
    )
    .unwrap();

    let summary = summarize(&ctx.state, SummaryPeriod::Month);
    assert_eq!(summary.income_cents, 10_000);
    assert_eq!(summary.entries.len(), 1);
}

/// The year summary spans the whole calendar year.
#[test]
fn year_summary_covers_the_calendar_year() {
    let ctx = TestContext::new();
    let year = Local::now().date_naive().format("%Y").to_string();
    sync::create_entry(
        &ctx.state,
        &TestContext::new_entry(EntryKind::Income, &format!("{}-01-01", year), 5_000, "New year"),
    )
    .unwrap();
    sync::create_entry(
        &ctx.state,
        &TestContext::new_entry(EntryKind::Expense, &today_str(), 2_000, "Today"),
    )
    .unwrap();

    let summary = summarize(&ctx.state, SummaryPeriod::Year);
    assert_eq!(summary.income_cents, 5_000);
    assert_eq!(summary.expense_cents, 2_000);
    assert_eq!(summary.balance_cents, 3_000);
}

/// Summaries degrade to zeros instead of surfacing errors.
#[test]
fn summary_degrades_when_signed_out() {
    let ctx = TestContext::new();
    sync::create_entry(
        &ctx.state,
        &TestContext::new_entry(EntryKind::Income, &today_str(), 10_000, "Invoice"),
    )
    .unwrap();
    ctx.sign_out();

    let summary = summarize(&ctx.state, SummaryPeriod::Month);
    assert_eq!(summary.income_cents, 0);
    assert_eq!(summary.expense_cents, 0);
    assert_eq!(summary.balance_cents, 0);
    assert!(summary.entries.is_empty());
}
