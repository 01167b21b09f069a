//! Period rollups over the ledger. Summaries are always "as of now" and
//! degrade to zeros instead of failing.

use chrono::Local;
use tracing::warn;

use crate::date_utils::{month_end, month_start, year_end, year_start};
use crate::db::queries::ledger::{self, LedgerFilter};
use crate::error::AppResult;
use crate::models::{EntryKind, LedgerEntry};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryPeriod {
    Month,
    Year,
}

impl SummaryPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryPeriod::Month => "month",
            SummaryPeriod::Year => "year",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "month" => Some(SummaryPeriod::Month),
            "year" => Some(SummaryPeriod::Year),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PeriodSummary {
    pub income_cents: i64,
    pub expense_cents: i64,
    pub balance_cents: i64,
    pub entries: Vec<LedgerEntry>,
}

impl PeriodSummary {
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        let mut income_cents = 0;
        let mut expense_cents = 0;
        for entry in &entries {
            match entry.kind {
                EntryKind::Income => income_cents += entry.amount_cents,
                EntryKind::Expense => expense_cents += entry.amount_cents,
            }
        }
        Self {
            income_cents,
            expense_cents,
            balance_cents: income_cents - expense_cents,
            entries,
        }
    }
}

/// Income, expense, and balance over the current month or year.
pub fn summarize(state: &AppState, period: SummaryPeriod) -> PeriodSummary {
    match try_summarize(state, period) {
        Ok(summary) => summary,
        Err(e) => {
            warn!(period = period.as_str(), error = %e, "Summary failed, returning zeros");
            PeriodSummary::default()
        }
    }
}

fn try_summarize(state: &AppState, period: SummaryPeriod) -> AppResult<PeriodSummary> {
    let owner = state.require_owner()?;
    let today = Local::now().date_naive();
    let (start, end) = match period {
        SummaryPeriod::Month => (month_start(today), month_end(today)),
        SummaryPeriod::Year => (year_start(today), year_end(today)),
    };

    let conn = state.db.get()?;
    let entries = ledger::list_entries(
        &conn,
        &owner,
        &LedgerFilter {
            from_date: Some(start.format("%Y-%m-%d").to_string()),
            to_date: Some(end.format("%Y-%m-%d").to_string()),
            ..Default::default()
        },
    )?;
    Ok(PeriodSummary::from_entries(entries))
}
