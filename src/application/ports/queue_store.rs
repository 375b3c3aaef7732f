use crate::domain::entities::QueueEntry;
use crate::domain::value_objects::{QueueStatus, RecordPayload};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable, crash-tolerant storage for records pending upload.
///
/// Only entries with `pending` status are sync candidates; `list_pending`
/// returns a freshly-materialized FIFO snapshot, never a live view.
#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn enqueue(&self, payload: RecordPayload) -> Result<QueueEntry, AppError>;
    async fn list_pending(&self) -> Result<Vec<QueueEntry>, AppError>;
    /// Fails with `AppError::NotFound` if the entry no longer exists.
    async fn set_status(&self, id: i64, status: QueueStatus) -> Result<(), AppError>;
    /// Idempotent; removing a missing id is not an error.
    async fn remove(&self, id: i64) -> Result<(), AppError>;
    async fn count_pending(&self) -> Result<u64, AppError>;
}

/// Session flags noting whether the user was last active on the
/// offline-capture page, so reconnection knows whether to auto-sync.
#[async_trait]
pub trait CaptureContextStore: Send + Sync {
    async fn mark_capture_page(&self) -> Result<(), AppError>;
    async fn was_on_capture_page(&self) -> Result<bool, AppError>;
    async fn clear_capture_page(&self) -> Result<(), AppError>;
}
