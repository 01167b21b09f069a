//! Shared test utilities for integration tests.
//!
//! Builds an `AppState` over a fresh in-memory database with migrations
//! applied, a fixed owner, and temp-dir backed notification/receipt
//! storage.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use tally::cache::NotificationCache;
use tally::config::Config;
use tally::db::{create_in_memory_pool, migrations};
use tally::identity::StaticIdentity;
use tally::models::{EntryKind, NewLedgerEntry, NewSale};
use tally::services::receipts::DirReceiptStore;
use tally::state::AppState;
use tempfile::TempDir;

pub const OWNER: &str = "owner-1";

pub struct TestContext {
    pub state: AppState,
    pub identity: Arc<StaticIdentity>,
    _tmp: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        {
            let conn = pool.get().expect("Failed to get connection");
            migrations::run_migrations(&conn, Path::new("migrations"))
                .expect("Failed to run migrations");
        }

        let tmp = TempDir::new().expect("Failed to create temp dir");
        let config = Config {
            database_path: ":memory:".into(),
            migrations_path: "migrations".into(),
            notifications_path: tmp.path().join("notifications.json"),
            receipts_path: tmp.path().join("receipts"),
        };
        let identity = Arc::new(StaticIdentity::new(OWNER));

        let state = AppState {
            db: pool,
            notifications: Arc::new(NotificationCache::new(config.notifications_path.clone())),
            receipts: Arc::new(DirReceiptStore::new(config.receipts_path.clone())),
            config: Arc::new(config),
            identity: identity.clone(),
        };

        Self {
            state,
            identity,
            _tmp: tmp,
        }
    }

    pub fn sign_out(&self) {
        self.identity.set_owner(None);
    }

    /// Insert an obligation directly, bypassing due-date derivation, so
    /// tests can pin arbitrary due dates.
    pub fn insert_obligation(&self, competence: &str, due_date: &str, amount_cents: i64) -> i64 {
        let conn = self.state.db.get().unwrap();
        tally::db::queries::obligations::create_obligation(
            &conn, OWNER, competence, due_date, amount_cents,
        )
        .unwrap()
    }

    pub fn new_entry(
        kind: EntryKind,
        date: &str,
        amount_cents: i64,
        description: &str,
    ) -> NewLedgerEntry {
        NewLedgerEntry {
            kind,
            date: date.into(),
            amount_cents,
            description: description.into(),
            category: None,
            payment_method: None,
        }
    }

    pub fn new_sale(date: &str, amount_cents: i64, description: &str) -> NewSale {
        NewSale {
            date: date.into(),
            description: description.into(),
            amount_cents,
            payment_method: Some("pix".into()),
            customer: None,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
