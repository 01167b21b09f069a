use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    TaxAlert,
    Info,
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Numeric rank for display sorting; higher sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// One item in the locally persisted notification feed. Read state only
/// moves one way, unread to read; items are never removed short of a
/// full cache clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationItem {
    pub id: String,
    pub message: String,
    pub created_at: String,
    pub read: bool,
    pub category: NotificationCategory,
    pub priority: Priority,
    /// Dedup discriminator for generated alerts. Items written before
    /// this field existed fall back to message-content matching.
    #[serde(default)]
    pub source_key: Option<String>,
}
