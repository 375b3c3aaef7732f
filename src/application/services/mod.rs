pub mod connectivity_service;
pub mod sync_service;

pub use connectivity_service::{ConnectivityEvent, ConnectivityMonitor, ConnectivityState};
pub use sync_service::SyncService;
