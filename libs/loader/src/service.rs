use std::sync::Arc;

use docstore_api::{DocumentStore, FindQuery, RecordFilter, RecordPatch, StoredRecord};

use crate::error::LoaderError;
use crate::loader::{BatchLoader, LoadPlan};
use crate::progress::{LoadSummary, ProgressObserver, TracingObserver};

/// How many documents `delete_latest_10` removes.
pub const LATEST_DELETE_COUNT: usize = 10;

/// The operations exposed to callers. Each one is an independent call
/// (or, for `insert_records` and `delete_latest`, a short sequence of
/// calls) against one collection; nothing spans operations.
pub struct RecordService {
    store: Arc<dyn DocumentStore>,
    observer: Arc<dyn ProgressObserver>,
}

impl RecordService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn insert_records(&self, total: u64, batch_size: usize) -> Result<LoadSummary, LoaderError> {
        let plan = LoadPlan::new(total, batch_size)?;
        BatchLoader::new(self.store.clone())
            .with_observer(self.observer.clone())
            .run(plan)
            .await
    }

    pub async fn delete_latest_10(&self) -> Result<u64, LoaderError> {
        self.delete_latest(LATEST_DELETE_COUNT).await
    }

    /// Delete the `n` documents with the most recent `created_at`.
    ///
    /// Selects by timestamp only; among documents sharing the boundary
    /// timestamp, which ones are picked is up to the store. Fewer than
    /// `n` documents → all of them are deleted.
    pub async fn delete_latest(&self, n: usize) -> Result<u64, LoaderError> {
        if n == 0 {
            return Ok(0);
        }

        let latest = self
            .store
            .find(&FindQuery::latest(n))
            .await
            .map_err(|e| e.with_context("find latest"))?;
        if latest.is_empty() {
            tracing::info!(requested = n, "collection empty, nothing to delete");
            return Ok(0);
        }

        let ids = latest.into_iter().map(|d| d.id).collect();
        let deleted = self
            .store
            .delete_many(&RecordFilter::IdIn(ids))
            .await
            .map_err(|e| e.with_context("delete latest"))?;

        tracing::info!(requested = n, deleted, "deleted latest records");
        Ok(deleted)
    }

    pub async fn fetch_record(&self, record_id: u64) -> Result<Option<StoredRecord>, LoaderError> {
        let found = self
            .store
            .find_one(&RecordFilter::RecordId(record_id))
            .await
            .map_err(|e| e.with_context("fetch_record"))?;

        match found {
            Some(ref doc) => tracing::info!(
                record_id,
                id = %doc.id,
                name = %doc.record.name,
                email = %doc.record.email,
                created_at = %doc.record.created_at,
                "record found"
            ),
            None => tracing::info!(record_id, "record not found"),
        }
        Ok(found)
    }

    /// Set `name` on the record with `record_id`. Returns whether a
    /// document was modified; a missing id is `false`, not an error.
    pub async fn update_record(&self, record_id: u64, new_name: &str) -> Result<bool, LoaderError> {
        let ack = self
            .store
            .update_one(&RecordFilter::RecordId(record_id), &RecordPatch::name(new_name))
            .await
            .map_err(|e| e.with_context("update_record"))?;

        let modified = ack.modified > 0;
        if modified {
            tracing::info!(record_id, new_name, "record updated");
        } else {
            tracing::info!(record_id, matched = ack.matched, "record not found or not updated");
        }
        Ok(modified)
    }

    pub async fn count_records(&self) -> Result<u64, LoaderError> {
        let count = self
            .store
            .count_documents(&RecordFilter::All)
            .await
            .map_err(|e| e.with_context("count_records"))?;
        tracing::info!(count, "total records in collection");
        Ok(count)
    }
}
