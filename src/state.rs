use crate::application::ports::{AuthSession, Notifier, RemoteStore};
use crate::application::services::{
    ConnectivityEvent, ConnectivityMonitor, ConnectivityState, SyncService,
};
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::offline::SqliteQueueStore;
use crate::shared::config::AppConfig;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Fully wired offline stack. The host platform supplies the remote store,
/// session, and notification surfaces; everything else is built here.
#[derive(Clone)]
pub struct AppState {
    pub pool: ConnectionPool,
    pub queue: Arc<SqliteQueueStore>,
    pub sync_service: Arc<SyncService>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub connectivity_tx: broadcast::Sender<ConnectivityEvent>,
}

impl AppState {
    pub async fn new(
        config: &AppConfig,
        remote: Arc<dyn RemoteStore>,
        session: Arc<dyn AuthSession>,
        notifier: Arc<dyn Notifier>,
        initially_online: bool,
    ) -> anyhow::Result<Self> {
        let pool = ConnectionPool::new(&config.database).await?;
        pool.migrate().await?;
        Self::with_pool(pool, config, remote, session, notifier, initially_online)
    }

    /// Wires the stack around an existing pool. Migrations must already have
    /// been applied.
    pub fn with_pool(
        pool: ConnectionPool,
        config: &AppConfig,
        remote: Arc<dyn RemoteStore>,
        session: Arc<dyn AuthSession>,
        notifier: Arc<dyn Notifier>,
        initially_online: bool,
    ) -> anyhow::Result<Self> {
        let queue = Arc::new(SqliteQueueStore::new(pool.get_pool().clone()));
        let state = Arc::new(ConnectivityState::new(initially_online));

        let sync_service = SyncService::new(
            queue.clone(),
            queue.clone(),
            remote,
            session,
            notifier.clone(),
            state.clone(),
        );
        let connectivity = ConnectivityMonitor::new(
            state,
            queue.clone(),
            queue.clone(),
            sync_service.clone(),
            notifier,
            config.sync.auto_sync,
        );

        let (connectivity_tx, rx) = broadcast::channel(16);
        let _ = connectivity.spawn(rx);

        Ok(Self {
            pool,
            queue,
            sync_service,
            connectivity,
            connectivity_tx,
        })
    }
}
