use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Direction of a money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(EntryKind::Income),
            "expense" => Some(EntryKind::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which derived store owns an entry. Stamped by the synchronization
/// engine on entries it creates; absent on plain user entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkedKind {
    Tax,
    Sale,
}

impl LinkedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkedKind::Tax => "tax",
            LinkedKind::Sale => "sale",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tax" => Some(LinkedKind::Tax),
            "sale" => Some(LinkedKind::Sale),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub owner_id: String,
    pub kind: EntryKind,
    pub date: String,
    pub amount_cents: i64,
    pub description: String,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub linked_kind: Option<LinkedKind>,
    pub created_at: String,
    pub updated_at: String,
}

impl LedgerEntry {
    pub fn amount_display(&self) -> String {
        format!("{}.{:02}", self.amount_cents / 100, self.amount_cents % 100)
    }

    /// Amount with the sign of the movement: income positive, expense negative.
    pub fn signed_cents(&self) -> i64 {
        match self.kind {
            EntryKind::Income => self.amount_cents,
            EntryKind::Expense => -self.amount_cents,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLedgerEntry {
    pub kind: EntryKind,
    pub date: String,
    pub amount_cents: i64,
    pub description: String,
    pub category: Option<String>,
    pub payment_method: Option<String>,
}

impl NewLedgerEntry {
    pub fn validate(&self) -> AppResult<()> {
        if self.amount_cents < 0 {
            return Err(AppError::Validation("amount must not be negative".into()));
        }
        if NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").is_err() {
            return Err(AppError::Validation(format!("invalid date: {}", self.date)));
        }
        Ok(())
    }

    pub fn from_decimal(amount: f64) -> i64 {
        (amount * 100.0).round() as i64
    }
}
