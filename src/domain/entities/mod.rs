pub mod input_record;
pub mod queue_entry;
pub mod sync_outcome;

pub use input_record::InputRecord;
pub use queue_entry::{QueueEntry, QUEUE_SCHEMA_VERSION};
pub use sync_outcome::SyncOutcome;
