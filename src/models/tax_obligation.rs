use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date_utils;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObligationStatus {
    Pending,
    Paid,
}

impl ObligationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObligationStatus::Pending => "pending",
            ObligationStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ObligationStatus::Pending),
            "paid" => Some(ObligationStatus::Paid),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObligationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A monthly DAS payment obligation. Paid obligations always carry a
/// payment date and a back-reference to their expense ledger entry;
/// pending ones carry neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxObligation {
    pub id: i64,
    pub owner_id: String,
    /// Year-month the obligation covers, `YYYY-MM`. The due date falls in
    /// the month after it.
    pub competence: String,
    pub due_date: String,
    pub amount_cents: i64,
    pub status: ObligationStatus,
    pub payment_date: Option<String>,
    pub receipt_url: Option<String>,
    pub ledger_entry_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl TaxObligation {
    pub fn is_paid(&self) -> bool {
        self.status == ObligationStatus::Paid
    }

    /// Competence period as shown to the user, `MM/YYYY`.
    pub fn competence_display(&self) -> String {
        match self.competence.split_once('-') {
            Some((year, month)) => format!("{}/{}", month, year),
            None => self.competence.clone(),
        }
    }

    /// Due date as shown to the user, `DD/MM/YYYY`.
    pub fn due_date_display(&self) -> String {
        match NaiveDate::parse_from_str(&self.due_date, "%Y-%m-%d") {
            Ok(date) => date.format("%d/%m/%Y").to_string(),
            Err(_) => self.due_date.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTaxObligation {
    pub competence: String,
    pub amount_cents: i64,
}

impl NewTaxObligation {
    pub fn validate(&self) -> AppResult<()> {
        if self.amount_cents < 0 {
            return Err(AppError::Validation("amount must not be negative".into()));
        }
        if date_utils::parse_period_key(&self.competence).is_none() {
            return Err(AppError::Validation(format!(
                "invalid competence period: {}",
                self.competence
            )));
        }
        Ok(())
    }
}
