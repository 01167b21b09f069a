use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// A file handed in alongside a payment or sale.
#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// External receipt storage. The core stores and clears URL references
/// only; file content is never inspected.
pub trait ReceiptStore: Send + Sync {
    /// Store a file and return the URL under which it is reachable.
    fn upload(&self, name: &str, bytes: &[u8]) -> AppResult<String>;
    /// Remove a previously uploaded file.
    fn delete(&self, url: &str) -> AppResult<()>;
}

/// Receipt storage backed by a local directory; URLs are `file://` paths.
pub struct DirReceiptStore {
    root: PathBuf,
}

impl DirReceiptStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ReceiptStore for DirReceiptStore {
    fn upload(&self, name: &str, bytes: &[u8]) -> AppResult<String> {
        fs::create_dir_all(&self.root)?;

        let stored_name = match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let path = self.root.join(&stored_name);
        fs::write(&path, bytes)?;

        debug!(name = name, stored = %path.display(), "Stored receipt");
        Ok(format!("file://{}", path.display()))
    }

    fn delete(&self, url: &str) -> AppResult<()> {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if !path.starts_with(&self.root) {
            return Err(AppError::Validation(format!(
                "receipt URL outside storage: {}",
                url
            )));
        }
        fs::remove_file(path)?;
        debug!(url = url, "Removed receipt");
        Ok(())
    }
}
