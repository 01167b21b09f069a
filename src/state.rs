use std::sync::Arc;

use crate::cache::NotificationCache;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::identity::IdentityProvider;
use crate::services::receipts::ReceiptStore;

/// Context passed into every operation: the store handle, the identity
/// seam, the notification slot, and receipt storage.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityProvider>,
    pub notifications: Arc<NotificationCache>,
    pub receipts: Arc<dyn ReceiptStore>,
}

impl AppState {
    /// Current owner id; every read and write is scoped by it.
    pub fn require_owner(&self) -> AppResult<String> {
        self.identity.current_owner().ok_or(AppError::NotAuthenticated)
    }
}
