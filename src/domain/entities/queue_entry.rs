use crate::domain::value_objects::{QueueStatus, RecordPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version stamped on every persisted queue entry. Bump when the
/// payload envelope changes shape.
pub const QUEUE_SCHEMA_VERSION: u32 = 1;

/// One locally-persisted record awaiting remote persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueEntry {
    /// Store-assigned monotonic id.
    pub id: i64,
    /// Stable UUID, doubles as the deterministic remote document id.
    pub local_id: String,
    pub payload: RecordPayload,
    pub status: QueueStatus,
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub last_updated: Option<DateTime<Utc>>,
}
