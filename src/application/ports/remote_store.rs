use crate::domain::value_objects::{DocumentFields, DocumentId};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Collection holding synced input records.
pub const RECORDS_COLLECTION: &str = "records";
/// Collection holding field aggregate documents.
pub const FIELDS_COLLECTION: &str = "fields";
/// Sub-collection of a record holding purchased-item line items.
pub const BOUGHT_ITEMS_SUBCOLLECTION: &str = "bought_items";
/// Sub-collection of a record holding vehicle-update line items.
pub const VEHICLE_UPDATES_SUBCOLLECTION: &str = "vehicle_updates";

/// The externally-owned document store that is the system of record.
///
/// Transport and authentication are the collaborator's concern; failures of
/// any kind surface as `AppError::RemoteWrite`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Creates or overwrites a document with a caller-chosen id. Used for
    /// main records keyed by the queue entry's `local_id`, so a retried
    /// upload lands on the same document instead of duplicating it.
    async fn put_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: DocumentFields,
    ) -> Result<(), AppError>;

    /// Appends a document to a sub-collection, returning the generated id.
    async fn add_subdocument(
        &self,
        collection: &str,
        doc_id: &str,
        subcollection: &str,
        fields: DocumentFields,
    ) -> Result<DocumentId, AppError>;

    /// Merges fields into an existing document.
    async fn update_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: DocumentFields,
    ) -> Result<(), AppError>;
}
