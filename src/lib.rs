pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{
    AuthSession, CaptureContextStore, NoticeKind, NoticeOptions, Notifier, QueueStore, RemoteStore,
};
pub use application::services::{
    ConnectivityEvent, ConnectivityMonitor, ConnectivityState, SyncService,
};
pub use domain::entities::{InputRecord, QueueEntry, SyncOutcome, QUEUE_SCHEMA_VERSION};
pub use shared::config::AppConfig;
pub use shared::error::AppError;
pub use state::AppState;

pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canemap_offline=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
