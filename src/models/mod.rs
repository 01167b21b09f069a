pub mod ledger_entry;
pub mod notification;
pub mod sale;
pub mod tax_obligation;

pub use ledger_entry::{EntryKind, LedgerEntry, LinkedKind, NewLedgerEntry};
pub use notification::{NotificationCategory, NotificationItem, Priority};
pub use sale::{NewSale, SaleRecord};
pub use tax_obligation::{NewTaxObligation, ObligationStatus, TaxObligation};
