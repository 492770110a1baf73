use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::RwLock;

use docstore_api::{
    DocId, DocumentStore, FindQuery, InsertAck, Record, RecordFilter, RecordPatch, SortField,
    SortOrder, StoreError, StoredRecord, UpdateAck,
};

// ═══════════════════════════════════════════════════════════════
//  MemoryStoreConfig
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct MemoryStoreConfig {
    /// Reject inserts that would grow the collection past this size.
    /// `None` = unbounded.
    #[serde(default)]
    pub max_documents: Option<usize>,
}

// ═══════════════════════════════════════════════════════════════
//  MemoryStore
// ═══════════════════════════════════════════════════════════════

/// In-process document collection. Same observable semantics as the
/// MongoDB backend for the operations the loader uses; used for tests
/// and dry runs.
pub struct MemoryStore {
    docs: RwLock<Vec<StoredRecord>>,
    next_id: AtomicU64,
    max_documents: Option<usize>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            max_documents: config.max_documents,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::unavailable("memory store is closed"));
        }
        Ok(())
    }

    fn next_doc_id(&self) -> DocId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        DocId::new(format!("mem-{n:016x}"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(MemoryStoreConfig::default())
    }
}

fn apply_patch(doc: &mut StoredRecord, patch: &RecordPatch) -> bool {
    if doc.record.name == patch.name {
        return false;
    }
    doc.record.name = patch.name.clone();
    true
}

fn sort_docs(docs: &mut [StoredRecord], field: SortField, order: SortOrder) {
    // Stable sort; equal keys keep insertion order, which callers must not rely on.
    match field {
        SortField::CreatedAt => docs.sort_by_key(|d| d.record.created_at),
        SortField::RecordId => docs.sort_by_key(|d| d.record.record_id),
    }
    if order == SortOrder::Desc {
        docs.reverse();
    }
}

impl DocumentStore for MemoryStore {
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async { self.ensure_open() })
    }

    fn insert_many(
        &self,
        records: &[Record],
    ) -> Pin<Box<dyn Future<Output = Result<InsertAck, StoreError>> + Send + '_>> {
        let records = records.to_vec();
        Box::pin(async move {
            self.ensure_open()?;
            if records.is_empty() {
                return Err(StoreError::invalid_request("insert_many: empty batch"));
            }

            let mut docs = self.docs.write().await;
            if let Some(max) = self.max_documents {
                if docs.len() + records.len() > max {
                    return Err(StoreError::rejected(format!(
                        "collection full: {} + {} exceeds {max} documents",
                        docs.len(),
                        records.len()
                    )));
                }
            }

            let inserted = records.len() as u64;
            for record in records {
                docs.push(StoredRecord { id: self.next_doc_id(), record });
            }
            tracing::trace!(inserted, total = docs.len(), "memory insert_many");
            Ok(InsertAck { inserted })
        })
    }

    fn find(
        &self,
        query: &FindQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredRecord>, StoreError>> + Send + '_>> {
        let query = query.clone();
        Box::pin(async move {
            self.ensure_open()?;
            let docs = self.docs.read().await;
            let mut result: Vec<StoredRecord> =
                docs.iter().filter(|d| query.filter.matches(d)).cloned().collect();

            if let Some((field, order)) = query.sort {
                sort_docs(&mut result, field, order);
            }
            if let Some(limit) = query.limit {
                result.truncate(limit);
            }
            Ok(result)
        })
    }

    fn find_one(
        &self,
        filter: &RecordFilter,
    ) -> Pin<Box<dyn Future<Output = Result<Option<StoredRecord>, StoreError>> + Send + '_>> {
        let filter = filter.clone();
        Box::pin(async move {
            self.ensure_open()?;
            let docs = self.docs.read().await;
            Ok(docs.iter().find(|d| filter.matches(d)).cloned())
        })
    }

    fn update_one(
        &self,
        filter: &RecordFilter,
        patch: &RecordPatch,
    ) -> Pin<Box<dyn Future<Output = Result<UpdateAck, StoreError>> + Send + '_>> {
        let filter = filter.clone();
        let patch = patch.clone();
        Box::pin(async move {
            self.ensure_open()?;
            let mut docs = self.docs.write().await;
            match docs.iter_mut().find(|d| filter.matches(d)) {
                Some(doc) => {
                    let modified = if apply_patch(doc, &patch) { 1 } else { 0 };
                    Ok(UpdateAck { matched: 1, modified })
                }
                None => Ok(UpdateAck::default()),
            }
        })
    }

    fn delete_many(
        &self,
        filter: &RecordFilter,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>> {
        let filter = filter.clone();
        Box::pin(async move {
            self.ensure_open()?;
            let mut docs = self.docs.write().await;
            let before = docs.len();
            docs.retain(|d| !filter.matches(d));
            Ok((before - docs.len()) as u64)
        })
    }

    fn count_documents(
        &self,
        filter: &RecordFilter,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>> {
        let filter = filter.clone();
        Box::pin(async move {
            self.ensure_open()?;
            let docs = self.docs.read().await;
            Ok(docs.iter().filter(|d| filter.matches(d)).count() as u64)
        })
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async {
            self.closed.store(true, Ordering::Release);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use docstore_api::ErrorKind;

    use super::*;

    fn record(id: u64, offset_ms: i64) -> Record {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Record {
            record_id: id,
            name: format!("User_{id}"),
            email: format!("user_{id}@example.com"),
            created_at: base + TimeDelta::milliseconds(offset_ms),
        }
    }

    #[tokio::test]
    async fn insert_and_count() {
        let store = MemoryStore::default();
        let ack = store.insert_many(&[record(1, 0), record(2, 1)]).await.unwrap();
        assert_eq!(ack.inserted, 2);
        assert_eq!(store.count_documents(&RecordFilter::All).await.unwrap(), 2);
        assert_eq!(store.count_documents(&RecordFilter::RecordId(2)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn find_latest_orders_by_created_at() {
        let store = MemoryStore::default();
        store
            .insert_many(&[record(1, 30), record(2, 10), record(3, 20)])
            .await
            .unwrap();

        let latest = store.find(&FindQuery::latest(2)).await.unwrap();
        let ids: Vec<u64> = latest.iter().map(|d| d.record.record_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn delete_by_doc_ids() {
        let store = MemoryStore::default();
        store.insert_many(&[record(1, 0), record(2, 1), record(3, 2)]).await.unwrap();

        let first = store.find_one(&RecordFilter::RecordId(1)).await.unwrap().unwrap();
        let third = store.find_one(&RecordFilter::RecordId(3)).await.unwrap().unwrap();
        let deleted = store
            .delete_many(&RecordFilter::IdIn(vec![first.id, third.id]))
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(store.count_documents(&RecordFilter::All).await.unwrap(), 1);
        assert!(store.find_one(&RecordFilter::RecordId(2)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_reports_modified() {
        let store = MemoryStore::default();
        store.insert_many(&[record(5, 0)]).await.unwrap();

        let ack = store
            .update_one(&RecordFilter::RecordId(5), &RecordPatch::name("Renamed"))
            .await
            .unwrap();
        assert_eq!(ack, UpdateAck { matched: 1, modified: 1 });

        // Same value again: matched but not modified.
        let ack = store
            .update_one(&RecordFilter::RecordId(5), &RecordPatch::name("Renamed"))
            .await
            .unwrap();
        assert_eq!(ack, UpdateAck { matched: 1, modified: 0 });

        let ack = store
            .update_one(&RecordFilter::RecordId(99), &RecordPatch::name("x"))
            .await
            .unwrap();
        assert_eq!(ack, UpdateAck::default());
    }

    #[tokio::test]
    async fn capacity_rejects_whole_batch() {
        let store = MemoryStore::new(MemoryStoreConfig { max_documents: Some(3) });
        store.insert_many(&[record(1, 0), record(2, 0)]).await.unwrap();

        let err = store.insert_many(&[record(3, 0), record(4, 0)]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(store.count_documents(&RecordFilter::All).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn closed_store_rejects_calls() {
        let store = MemoryStore::default();
        store.close().await.unwrap();
        assert!(store.is_closed());
        let err = store.count_documents(&RecordFilter::All).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }
}
