use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{action}, but {detail}")]
    PartialSync { action: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short text for a transient UI notification. Names the attempted
    /// action and keeps internal error detail out; that detail is logged
    /// where the error occurs.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            AppError::NotAuthenticated => format!("Error {}: not signed in", action),
            AppError::NotFound(what) => format!("Error {}: {} does not exist", action, what),
            AppError::Validation(msg) => format!("Error {}: {}", action, msg),
            AppError::PartialSync { action: done, detail } => {
                format!("{}, but {}", done, detail)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                format!("Error {}: storage failure", action)
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {:?}", e);
                format!("Error {}: storage connection failure", action)
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                format!("Error {}: file storage failure", action)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                format!("Error {}", action)
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
