use serde::{Deserialize, Serialize};

/// Lifecycle of a queued record. `Synced` entries are deleted rather than
/// retained; the variant exists so every persisted value can be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    Pending,
    Syncing,
    Synced,
    Unknown(String),
}

impl QueueStatus {
    pub fn as_str(&self) -> &str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Syncing => "syncing",
            QueueStatus::Synced => "synced",
            QueueStatus::Unknown(value) => value.as_str(),
        }
    }
}

impl From<&str> for QueueStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => QueueStatus::Pending,
            "syncing" => QueueStatus::Syncing,
            "synced" => QueueStatus::Synced,
            other => QueueStatus::Unknown(other.to_string()),
        }
    }
}
