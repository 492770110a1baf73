use std::future::Future;
use std::pin::Pin;

pub mod error;
pub mod types;
mod util;

pub use error::{ErrorKind, StoreError};
pub use types::{
    DocId, FindQuery, InsertAck, Record, RecordFilter, RecordPatch, SortField, SortOrder,
    StoredRecord, UpdateAck,
};
pub use util::now_utc;

// ════════════════════════════════════════════════════════════════
//  Document Store Trait
// ════════════════════════════════════════════════════════════════

/// A single document collection in an external store.
///
/// The loader and the record service only ever see this trait.
/// Backends: MongoDB collection, in-memory collection.
///
/// Every method is one independent request to the store; there is no
/// atomicity across calls.
pub trait DocumentStore: Send + Sync {
    /// Verify the store is reachable. Called once after opening.
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;

    /// Submit all records in one bulk-insert request.
    fn insert_many(&self, records: &[Record]) -> Pin<Box<dyn Future<Output = Result<InsertAck, StoreError>> + Send + '_>>;

    /// Select documents with optional single-key sort and limit.
    fn find(&self, query: &FindQuery) -> Pin<Box<dyn Future<Output = Result<Vec<StoredRecord>, StoreError>> + Send + '_>>;

    /// First document matching the filter, if any.
    fn find_one(&self, filter: &RecordFilter) -> Pin<Box<dyn Future<Output = Result<Option<StoredRecord>, StoreError>> + Send + '_>>;

    /// Apply a field-set patch to the first matching document.
    fn update_one(
        &self,
        filter: &RecordFilter,
        patch: &RecordPatch,
    ) -> Pin<Box<dyn Future<Output = Result<UpdateAck, StoreError>> + Send + '_>>;

    /// Delete every matching document. Returns the deleted count.
    fn delete_many(&self, filter: &RecordFilter) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>>;

    fn count_documents(&self, filter: &RecordFilter) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>>;

    /// Release the connection. The handle must not be used afterwards.
    fn close(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;
}
