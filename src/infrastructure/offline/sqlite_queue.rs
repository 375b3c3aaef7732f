use crate::application::ports::{CaptureContextStore, QueueStore};
use crate::domain::entities::{QueueEntry, QUEUE_SCHEMA_VERSION};
use crate::domain::value_objects::{QueueStatus, RecordPayload};
use crate::infrastructure::offline::rows::QueueEntryRow;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

const CAPTURE_PAGE_FLAG: &str = "handler_was_on_capture_page";

/// SQLite-backed record queue and session-flag store.
pub struct SqliteQueueStore {
    pool: SqlitePool,
}

impl SqliteQueueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn enqueue(&self, payload: RecordPayload) -> Result<QueueEntry, AppError> {
        let local_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let now_millis = now.timestamp_millis();
        let payload_json = serde_json::to_string(&payload.to_value())?;

        let result = sqlx::query(
            r#"
            INSERT INTO record_queue (local_id, payload, status, schema_version, created_at)
            VALUES (?, ?, 'pending', ?, ?)
            "#,
        )
        .bind(&local_id)
        .bind(&payload_json)
        .bind(QUEUE_SCHEMA_VERSION as i64)
        .bind(now_millis)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(target: "offline::queue", entry_id = id, "record queued");

        Ok(QueueEntry {
            id,
            local_id,
            payload,
            status: QueueStatus::Pending,
            schema_version: QUEUE_SCHEMA_VERSION,
            created_at: DateTime::from_timestamp_millis(now_millis).unwrap_or(now),
            last_updated: None,
        })
    }

    async fn list_pending(&self) -> Result<Vec<QueueEntry>, AppError> {
        let rows = sqlx::query_as::<_, QueueEntryRow>(
            r#"
            SELECT id, local_id, payload, status, schema_version, created_at, last_updated
            FROM record_queue
            WHERE status = 'pending'
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(QueueEntryRow::into_entry).collect()
    }

    async fn set_status(&self, id: i64, status: QueueStatus) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE record_queue SET status = ?, last_updated = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("queue entry {id} not found")));
        }
        Ok(())
    }

    async fn remove(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM record_queue WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_pending(&self) -> Result<u64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM record_queue WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl CaptureContextStore for SqliteQueueStore {
    async fn mark_capture_page(&self) -> Result<(), AppError> {
        sqlx::query("INSERT OR REPLACE INTO session_flags (key, value) VALUES (?, 'true')")
            .bind(CAPTURE_PAGE_FLAG)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn was_on_capture_page(&self) -> Result<bool, AppError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM session_flags WHERE key = ?")
                .bind(CAPTURE_PAGE_FLAG)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value.as_deref() == Some("true"))
    }

    async fn clear_capture_page(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM session_flags WHERE key = ?")
            .bind(CAPTURE_PAGE_FLAG)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
