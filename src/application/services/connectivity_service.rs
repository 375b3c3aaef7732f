use crate::application::ports::{CaptureContextStore, Notifier, QueueStore};
use crate::application::services::sync_service::SyncService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Platform reachability transitions, delivered over a broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

/// Shared online flag, written by the monitor and read by the sync engine.
/// Initialized from the platform's connectivity flag at startup.
#[derive(Debug)]
pub struct ConnectivityState {
    online: AtomicBool,
}

impl ConnectivityState {
    pub fn new(initially_online: bool) -> Self {
        Self {
            online: AtomicBool::new(initially_online),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

/// Passive reflector of platform connectivity signals.
///
/// Toggles the offline banner, persists the capture-page flag on the offline
/// transition, and triggers a sync pass on reconnection when queued records
/// exist and the user was last active on the capture page. Does not poll and
/// owns no timeout or cancellation semantics.
pub struct ConnectivityMonitor {
    state: Arc<ConnectivityState>,
    queue: Arc<dyn QueueStore>,
    context: Arc<dyn CaptureContextStore>,
    sync: Arc<SyncService>,
    notifier: Arc<dyn Notifier>,
    auto_sync: bool,
    on_capture_page: AtomicBool,
}

impl ConnectivityMonitor {
    pub fn new(
        state: Arc<ConnectivityState>,
        queue: Arc<dyn QueueStore>,
        context: Arc<dyn CaptureContextStore>,
        sync: Arc<SyncService>,
        notifier: Arc<dyn Notifier>,
        auto_sync: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            state,
            queue,
            context,
            sync,
            notifier,
            auto_sync,
            on_capture_page: AtomicBool::new(false),
        })
    }

    /// Records which page the user is on. Entering the capture page persists
    /// the session flag so a reload or reconnect still knows to auto-sync.
    pub async fn note_page(&self, capture_page: bool) {
        self.on_capture_page.store(capture_page, Ordering::SeqCst);
        if capture_page {
            if let Err(err) = self.context.mark_capture_page().await {
                tracing::warn!(
                    target: "offline::connectivity",
                    error = %err,
                    "failed to persist capture-page flag"
                );
            }
        }
    }

    pub async fn handle_event(self: &Arc<Self>, event: ConnectivityEvent) {
        match event {
            ConnectivityEvent::Online => self.handle_online().await,
            ConnectivityEvent::Offline => self.handle_offline().await,
        }
    }

    pub async fn handle_online(self: &Arc<Self>) {
        self.state.set_online(true);
        if let Err(err) = self.notifier.hide_offline_banner() {
            tracing::warn!(target: "offline::connectivity", error = %err, "failed to hide offline banner");
        }
        tracing::info!(target: "offline::connectivity", "device is online");

        if !self.auto_sync {
            return;
        }
        if !self.capture_flag_set().await {
            return;
        }
        if self.pending_count().await == 0 {
            return;
        }
        self.sync.trigger();
    }

    pub async fn handle_offline(&self) {
        self.state.set_online(false);
        let on_capture = self.on_capture_page.load(Ordering::SeqCst);
        if let Err(err) = self.notifier.show_offline_banner(on_capture) {
            tracing::warn!(target: "offline::connectivity", error = %err, "failed to show offline banner");
        }
        tracing::info!(target: "offline::connectivity", "device is offline");

        if on_capture {
            if let Err(err) = self.context.mark_capture_page().await {
                tracing::warn!(
                    target: "offline::connectivity",
                    error = %err,
                    "failed to persist capture-page flag"
                );
            }
        }
    }

    /// Startup check: pending records left over from a previous session are
    /// synced right away when the device is already online.
    pub async fn check_pending_on_startup(self: &Arc<Self>) {
        if !self.auto_sync || !self.state.is_online() {
            return;
        }
        if !self.capture_flag_set().await {
            return;
        }
        let pending = self.pending_count().await;
        if pending == 0 {
            return;
        }
        tracing::info!(
            target: "offline::connectivity",
            pending,
            "found pending records at startup, starting sync"
        );
        self.sync.trigger();
    }

    /// Consumes connectivity events until the sender is dropped.
    pub fn spawn(self: &Arc<Self>, mut rx: broadcast::Receiver<ConnectivityEvent>) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => monitor.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            target: "offline::connectivity",
                            skipped,
                            "connectivity events lagged"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    async fn capture_flag_set(&self) -> bool {
        match self.context.was_on_capture_page().await {
            Ok(flagged) => flagged,
            Err(err) => {
                tracing::warn!(
                    target: "offline::connectivity",
                    error = %err,
                    "failed to read capture-page flag"
                );
                false
            }
        }
    }

    async fn pending_count(&self) -> u64 {
        match self.queue.count_pending().await {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(
                    target: "offline::connectivity",
                    error = %err,
                    "failed to count pending records"
                );
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        AuthSession, NoticeKind, NoticeOptions, RemoteStore,
    };
    use crate::domain::value_objects::{DocumentFields, DocumentId, RecordPayload, UserId};
    use crate::infrastructure::offline::SqliteQueueStore;
    use crate::shared::error::AppError;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::str::FromStr;
    use std::sync::Mutex;
    use std::time::Duration;

    struct StaticSession(Option<UserId>);

    #[async_trait::async_trait]
    impl AuthSession for StaticSession {
        async fn current_user(&self) -> Option<UserId> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct CountingRemote {
        puts: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl RemoteStore for CountingRemote {
        async fn put_document(
            &self,
            _collection: &str,
            doc_id: &str,
            _fields: DocumentFields,
        ) -> Result<(), AppError> {
            self.puts.lock().unwrap().push(doc_id.to_string());
            Ok(())
        }

        async fn add_subdocument(
            &self,
            _collection: &str,
            _doc_id: &str,
            _subcollection: &str,
            _fields: DocumentFields,
        ) -> Result<DocumentId, AppError> {
            Ok(DocumentId::new("sub".to_string()).unwrap())
        }

        async fn update_document(
            &self,
            _collection: &str,
            _doc_id: &str,
            _fields: DocumentFields,
        ) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct BannerNotifier {
        events: Mutex<Vec<String>>,
    }

    impl Notifier for BannerNotifier {
        fn notify(&self, _: &str, _: NoticeKind, _: NoticeOptions) -> Result<(), String> {
            Ok(())
        }
        fn show_offline_banner(&self, on_capture_page: bool) -> Result<(), String> {
            self.events
                .lock()
                .unwrap()
                .push(format!("show_offline:{on_capture_page}"));
            Ok(())
        }
        fn hide_offline_banner(&self) -> Result<(), String> {
            self.events.lock().unwrap().push("hide_offline".to_string());
            Ok(())
        }
        fn show_sync_banner(&self) -> Result<(), String> {
            self.events.lock().unwrap().push("show_sync".to_string());
            Ok(())
        }
        fn hide_sync_banner(&self) -> Result<(), String> {
            self.events.lock().unwrap().push("hide_sync".to_string());
            Ok(())
        }
    }

    struct Harness {
        queue: Arc<SqliteQueueStore>,
        remote: Arc<CountingRemote>,
        notifier: Arc<BannerNotifier>,
        monitor: Arc<ConnectivityMonitor>,
    }

    async fn setup(initially_online: bool, auto_sync: bool) -> Harness {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        let queue = Arc::new(SqliteQueueStore::new(pool));
        let remote = Arc::new(CountingRemote::default());
        let notifier = Arc::new(BannerNotifier::default());
        let state = Arc::new(ConnectivityState::new(initially_online));

        let sync = SyncService::new(
            queue.clone(),
            queue.clone(),
            remote.clone(),
            Arc::new(StaticSession(Some(UserId::from_str("handler-1").unwrap()))),
            notifier.clone(),
            state.clone(),
        );
        let monitor = ConnectivityMonitor::new(
            state,
            queue.clone(),
            queue.clone(),
            sync,
            notifier.clone(),
            auto_sync,
        );

        Harness {
            queue,
            remote,
            notifier,
            monitor,
        }
    }

    fn payload(field_id: &str) -> RecordPayload {
        RecordPayload::new(json!({
            "userId": "handler-1",
            "fieldId": field_id,
            "status": "Tillering",
            "operation": "maintain",
            "taskType": "Weeding",
            "data": {}
        }))
        .unwrap()
    }

    async fn wait_until_drained(queue: &SqliteQueueStore) {
        for _ in 0..100 {
            if queue.count_pending().await.unwrap() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("queue was not drained in time");
    }

    #[tokio::test]
    async fn test_online_event_triggers_sync_of_pending_records() {
        let h = setup(false, true).await;

        h.monitor.note_page(true).await;
        h.queue.enqueue(payload("F1")).await.unwrap();

        h.monitor.handle_event(ConnectivityEvent::Online).await;
        wait_until_drained(&h.queue).await;

        assert_eq!(h.remote.puts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_online_event_without_capture_flag_does_not_sync() {
        let h = setup(false, true).await;

        h.queue.enqueue(payload("F1")).await.unwrap();
        h.monitor.handle_event(ConnectivityEvent::Online).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(h.queue.count_pending().await.unwrap(), 1);
        assert!(h.remote.puts.lock().unwrap().is_empty());
        // The banner is still dismissed on reconnection.
        assert!(h
            .notifier
            .events
            .lock()
            .unwrap()
            .contains(&"hide_offline".to_string()));
    }

    #[tokio::test]
    async fn test_online_event_with_auto_sync_disabled_does_not_sync() {
        let h = setup(false, false).await;

        h.monitor.note_page(true).await;
        h.queue.enqueue(payload("F1")).await.unwrap();
        h.monitor.handle_event(ConnectivityEvent::Online).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(h.queue.count_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_offline_event_shows_banner_and_marks_capture_context() {
        let h = setup(true, true).await;

        h.monitor.note_page(true).await;
        h.queue.clear_capture_page().await.unwrap();
        h.monitor.handle_event(ConnectivityEvent::Offline).await;

        assert!(!h.monitor.state.is_online());
        assert!(h.queue.was_on_capture_page().await.unwrap());
        assert_eq!(
            h.notifier.events.lock().unwrap().as_slice(),
            &["show_offline:true".to_string()]
        );
    }

    #[tokio::test]
    async fn test_offline_event_off_capture_page_leaves_flag_clear() {
        let h = setup(true, true).await;

        h.monitor.note_page(false).await;
        h.monitor.handle_event(ConnectivityEvent::Offline).await;

        assert!(!h.queue.was_on_capture_page().await.unwrap());
        assert_eq!(
            h.notifier.events.lock().unwrap().as_slice(),
            &["show_offline:false".to_string()]
        );
    }

    #[tokio::test]
    async fn test_startup_check_drains_leftover_records() {
        let h = setup(true, true).await;

        h.queue.mark_capture_page().await.unwrap();
        h.queue.enqueue(payload("F1")).await.unwrap();
        h.queue.enqueue(payload("F2")).await.unwrap();

        h.monitor.check_pending_on_startup().await;
        wait_until_drained(&h.queue).await;

        assert_eq!(h.remote.puts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_spawned_loop_processes_broadcast_events() {
        let h = setup(false, true).await;

        h.monitor.note_page(true).await;
        h.queue.enqueue(payload("F1")).await.unwrap();

        let (tx, rx) = broadcast::channel(4);
        let handle = h.monitor.spawn(rx);

        tx.send(ConnectivityEvent::Online).unwrap();
        wait_until_drained(&h.queue).await;
        assert_eq!(h.remote.puts.lock().unwrap().len(), 1);

        drop(tx);
        handle.await.unwrap();
    }
}
