use crate::application::ports::{
    AuthSession, CaptureContextStore, Notifier, QueueStore, RemoteStore,
    BOUGHT_ITEMS_SUBCOLLECTION, FIELDS_COLLECTION, RECORDS_COLLECTION,
    VEHICLE_UPDATES_SUBCOLLECTION,
};
use crate::application::ports::{NoticeKind, NoticeOptions};
use crate::application::services::connectivity_service::ConnectivityState;
use crate::domain::entities::{InputRecord, QueueEntry, SyncOutcome};
use crate::domain::growth;
use crate::domain::value_objects::{
    document_from_queued, DocumentFields, FieldValue, QueueStatus, UserId,
};
use crate::shared::error::AppError;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Drains the local queue into the remote store, preserving submission
/// order, with per-record isolation of failure.
///
/// At most one pass runs per instance at a time; re-entrant calls are
/// no-ops. Delivery is at-least-once: main records are upserts keyed by the
/// entry's `local_id`, so a retried upload overwrites rather than
/// duplicates.
pub struct SyncService {
    queue: Arc<dyn QueueStore>,
    context: Arc<dyn CaptureContextStore>,
    remote: Arc<dyn RemoteStore>,
    session: Arc<dyn AuthSession>,
    notifier: Arc<dyn Notifier>,
    connectivity: Arc<ConnectivityState>,
    in_flight: AtomicBool,
}

impl SyncService {
    pub fn new(
        queue: Arc<dyn QueueStore>,
        context: Arc<dyn CaptureContextStore>,
        remote: Arc<dyn RemoteStore>,
        session: Arc<dyn AuthSession>,
        notifier: Arc<dyn Notifier>,
        connectivity: Arc<ConnectivityState>,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue,
            context,
            remote,
            session,
            notifier,
            connectivity,
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Spawns a guarded sync pass in the background.
    pub fn trigger(self: &Arc<Self>) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = service.sync_all().await {
                tracing::error!(target: "offline::sync", error = %err, "sync pass failed");
            }
        });
    }

    /// Runs one complete drain attempt over the current pending snapshot.
    ///
    /// Returns a zero outcome without error when offline, unauthenticated,
    /// or when a pass is already in flight.
    pub async fn sync_all(&self) -> Result<SyncOutcome, AppError> {
        if !self.connectivity.is_online() {
            tracing::debug!(target: "offline::sync", "device is offline, skipping sync pass");
            return Ok(SyncOutcome::default());
        }
        let Some(user) = self.session.current_user().await else {
            tracing::debug!(target: "offline::sync", "no authenticated session, skipping sync pass");
            return Ok(SyncOutcome::default());
        };
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!(target: "offline::sync", "sync pass already in flight, skipping");
            return Ok(SyncOutcome::default());
        }

        let result = self.run_pass(&user).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run_pass(&self, user: &UserId) -> Result<SyncOutcome, AppError> {
        let pending = self.queue.list_pending().await?;
        if pending.is_empty() {
            tracing::debug!(target: "offline::sync", "no pending records to sync");
            return Ok(SyncOutcome::default());
        }

        // The sync banner supersedes the offline banner while a pass runs.
        self.surface(self.notifier.show_sync_banner(), "show sync banner");
        self.surface(self.notifier.hide_offline_banner(), "hide offline banner");
        tracing::info!(target: "offline::sync", pending = pending.len(), "starting sync pass");

        let mut outcome = SyncOutcome::default();
        for entry in &pending {
            if let Err(err) = self.queue.set_status(entry.id, QueueStatus::Syncing).await {
                // Entry vanished under us, e.g. removed by a duplicate pass
                // in another tab. Non-fatal.
                tracing::warn!(
                    target: "offline::sync",
                    entry_id = entry.id,
                    error = %err,
                    "could not mark entry as syncing"
                );
                continue;
            }

            let uploaded = async {
                self.sync_single(entry, user).await?;
                self.queue.remove(entry.id).await
            }
            .await;

            match uploaded {
                Ok(()) => {
                    outcome.success_count += 1;
                    tracing::debug!(target: "offline::sync", entry_id = entry.id, "record synced");
                }
                Err(err) => {
                    tracing::warn!(
                        target: "offline::sync",
                        entry_id = entry.id,
                        error = %err,
                        "record failed to sync, returning to queue"
                    );
                    if let Err(revert) =
                        self.queue.set_status(entry.id, QueueStatus::Pending).await
                    {
                        tracing::warn!(
                            target: "offline::sync",
                            entry_id = entry.id,
                            error = %revert,
                            "could not revert entry to pending"
                        );
                    }
                    outcome.failure_count += 1;
                }
            }
        }

        self.surface(self.notifier.hide_sync_banner(), "hide sync banner");
        self.report(&outcome);

        // The flag is cleared once the pass completes, regardless of partial
        // failure; going offline again re-arms it.
        if let Err(err) = self.context.clear_capture_page().await {
            tracing::warn!(target: "offline::sync", error = %err, "failed to clear capture-page flag");
        }

        tracing::info!(
            target: "offline::sync",
            success = outcome.success_count,
            failed = outcome.failure_count,
            "sync pass completed"
        );
        Ok(outcome)
    }

    async fn sync_single(&self, entry: &QueueEntry, user: &UserId) -> Result<(), AppError> {
        let record = InputRecord::from_payload(&entry.payload, user)?;

        self.remote
            .put_document(RECORDS_COLLECTION, &entry.local_id, record.main_fields.clone())
            .await?;

        for item in &record.bought_items {
            let Value::Object(map) = item else {
                tracing::warn!(
                    target: "offline::sync",
                    entry_id = entry.id,
                    "skipping malformed purchased-item line"
                );
                continue;
            };
            let mut fields = document_from_queued(map);
            fields.insert("createdAt".to_string(), FieldValue::ServerTimestamp);
            self.remote
                .add_subdocument(
                    RECORDS_COLLECTION,
                    &entry.local_id,
                    BOUGHT_ITEMS_SUBCOLLECTION,
                    fields,
                )
                .await?;
        }

        if let Some(Value::Object(map)) = &record.vehicle_updates {
            let mut fields = document_from_queued(map);
            fields.insert("createdAt".to_string(), FieldValue::ServerTimestamp);
            self.remote
                .add_subdocument(
                    RECORDS_COLLECTION,
                    &entry.local_id,
                    VEHICLE_UPDATES_SUBCOLLECTION,
                    fields,
                )
                .await?;
        }

        // Derived update on the parent field. Failure is logged, never fails
        // the record's sync; the aggregate can drift with no retry path.
        if record.is_planting_record() {
            if let Err(err) = self.apply_harvest_prediction(&record).await {
                tracing::warn!(
                    target: "offline::sync",
                    entry_id = entry.id,
                    field_id = %record.field_id,
                    error = %err,
                    "harvest prediction update failed"
                );
            }
        }

        Ok(())
    }

    async fn apply_harvest_prediction(&self, record: &InputRecord) -> Result<(), AppError> {
        let (Some(planting), Some(variety)) = (record.planting_date(), record.variety()) else {
            return Ok(());
        };

        let window = growth::harvest_window(planting, variety);
        let mut fields = DocumentFields::new();
        fields.insert("plantingDate".to_string(), FieldValue::from_datetime(planting));
        fields.insert(
            "sugarcane_variety".to_string(),
            FieldValue::Text(variety.to_string()),
        );
        fields.insert(
            "expectedHarvestDate".to_string(),
            FieldValue::from_datetime(window.predicted()),
        );
        fields.insert(
            "currentGrowthStage".to_string(),
            FieldValue::Text("Germination".to_string()),
        );
        fields.insert("status".to_string(), FieldValue::Text("active".to_string()));

        self.remote
            .update_document(FIELDS_COLLECTION, &record.field_id, fields)
            .await
    }

    fn report(&self, outcome: &SyncOutcome) {
        if outcome.success_count > 0 {
            let message = if outcome.success_count == 1 {
                "Input record synced successfully!".to_string()
            } else {
                format!(
                    "{} input record(s) synced successfully!",
                    outcome.success_count
                )
            };
            self.surface(
                self.notifier
                    .notify(&message, NoticeKind::Success, NoticeOptions::auto_close(3000)),
                "success toast",
            );
        }
        if outcome.failure_count > 0 {
            let message = format!(
                "{} record(s) failed to sync. Will retry on next connection.",
                outcome.failure_count
            );
            self.surface(
                self.notifier
                    .notify(&message, NoticeKind::Warning, NoticeOptions::auto_close(4000)),
                "failure toast",
            );
        }
    }

    fn surface(&self, result: Result<(), String>, action: &str) {
        if let Err(err) = result {
            tracing::warn!(
                target: "offline::sync",
                error = %err,
                action,
                "notification surface update failed"
            );
        }
    }
}
