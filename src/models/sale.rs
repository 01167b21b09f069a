use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A sale mirrored into the ledger as one income entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: i64,
    pub owner_id: String,
    pub date: String,
    pub description: String,
    pub amount_cents: i64,
    pub payment_method: Option<String>,
    pub customer: Option<String>,
    pub receipt_url: Option<String>,
    pub ledger_entry_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl SaleRecord {
    pub fn amount_display(&self) -> String {
        format!("{}.{:02}", self.amount_cents / 100, self.amount_cents % 100)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSale {
    pub date: String,
    pub description: String,
    pub amount_cents: i64,
    pub payment_method: Option<String>,
    pub customer: Option<String>,
}

impl NewSale {
    pub fn validate(&self) -> AppResult<()> {
        if self.amount_cents < 0 {
            return Err(AppError::Validation("amount must not be negative".into()));
        }
        if NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").is_err() {
            return Err(AppError::Validation(format!("invalid date: {}", self.date)));
        }
        Ok(())
    }
}
