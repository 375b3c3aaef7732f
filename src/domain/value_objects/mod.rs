pub mod document_id;
pub mod field_value;
pub mod queue_status;
pub mod record_payload;
pub mod user_id;

pub use document_id::DocumentId;
pub use field_value::{document_from_queued, DocumentFields, FieldValue};
pub use queue_status::QueueStatus;
pub use record_payload::RecordPayload;
pub use user_id::UserId;
