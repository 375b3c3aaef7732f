pub mod notifier;
pub mod queue_store;
pub mod remote_store;
pub mod session;

pub use notifier::{NoticeKind, NoticeOptions, Notifier};
pub use queue_store::{CaptureContextStore, QueueStore};
pub use remote_store::{
    RemoteStore, BOUGHT_ITEMS_SUBCOLLECTION, FIELDS_COLLECTION, RECORDS_COLLECTION,
    VEHICLE_UPDATES_SUBCOLLECTION,
};
pub use session::AuthSession;
