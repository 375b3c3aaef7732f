use crate::domain::entities::{QueueEntry, QUEUE_SCHEMA_VERSION};
use crate::domain::value_objects::{QueueStatus, RecordPayload};
use crate::shared::error::AppError;
use chrono::DateTime;
use sqlx::FromRow;

/// Raw `record_queue` row as stored. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, FromRow)]
pub struct QueueEntryRow {
    pub id: i64,
    pub local_id: String,
    pub payload: String,
    pub status: String,
    pub schema_version: i64,
    pub created_at: i64,
    pub last_updated: Option<i64>,
}

impl QueueEntryRow {
    pub fn into_entry(self) -> Result<QueueEntry, AppError> {
        if self.schema_version < 1 || self.schema_version > QUEUE_SCHEMA_VERSION as i64 {
            return Err(AppError::Validation(format!(
                "unsupported queue schema version {} for entry {}",
                self.schema_version, self.id
            )));
        }

        let payload = RecordPayload::from_json_str(&self.payload)
            .map_err(|e| AppError::Storage(format!("corrupt payload for entry {}: {e}", self.id)))?;
        let created_at = DateTime::from_timestamp_millis(self.created_at).ok_or_else(|| {
            AppError::Storage(format!(
                "invalid created_at {} for entry {}",
                self.created_at, self.id
            ))
        })?;
        let last_updated = match self.last_updated {
            Some(millis) => Some(DateTime::from_timestamp_millis(millis).ok_or_else(|| {
                AppError::Storage(format!(
                    "invalid last_updated {millis} for entry {}",
                    self.id
                ))
            })?),
            None => None,
        };

        Ok(QueueEntry {
            id: self.id,
            local_id: self.local_id,
            payload,
            status: QueueStatus::from(self.status.as_str()),
            schema_version: self.schema_version as u32,
            created_at,
            last_updated,
        })
    }
}
