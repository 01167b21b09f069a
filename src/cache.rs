use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::models::NotificationItem;

/// Durable store for the notification feed: a single named JSON slot on
/// disk with an in-memory mirror. Writes are last-write-wins; there is no
/// concurrent-writer protection.
///
/// The slot belongs to the client instance, not to the owner. Switching
/// owners without clearing it leaves the previous feed visible.
pub struct NotificationCache {
    path: PathBuf,
    slot: RwLock<Option<Vec<NotificationItem>>>,
}

impl NotificationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: RwLock::new(None),
        }
    }

    pub fn load(&self) -> Vec<NotificationItem> {
        if let Ok(guard) = self.slot.read() {
            if let Some(items) = guard.as_ref() {
                return items.clone();
            }
        }

        let items = read_slot(&self.path);
        if let Ok(mut guard) = self.slot.write() {
            *guard = Some(items.clone());
        }
        items
    }

    pub fn store(&self, items: &[NotificationItem]) {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).ok();
        }
        match serde_json::to_string(items) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist notifications");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize notifications"),
        }
        if let Ok(mut guard) = self.slot.write() {
            *guard = Some(items.to_vec());
        }
    }

    /// Full cache clear, the only way notifications are ever removed.
    pub fn clear(&self) {
        self.store(&[]);
    }
}

fn read_slot(path: &Path) -> Vec<NotificationItem> {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable notification slot");
            Vec::new()
        }),
        Err(_) => Vec::new(),
    }
}
