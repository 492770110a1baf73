//! Store wrapper shared by the loader integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use docstore_api::{
    DocumentStore, FindQuery, InsertAck, Record, RecordFilter, RecordPatch, StoreError,
    StoredRecord, UpdateAck,
};
use storage_memory::MemoryStore;

/// Delegates to a `MemoryStore`, records the ids of every bulk insert,
/// and optionally fails one submission.
pub struct RecordingStore {
    inner: MemoryStore,
    batches: Mutex<Vec<Vec<u64>>>,
    attempts: Mutex<u64>,
    /// 1-based insert_many call that returns an I/O error.
    fail_on: Option<u64>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::default(),
            batches: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
            fail_on: None,
        }
    }

    pub fn failing_on(batch: u64) -> Self {
        Self { fail_on: Some(batch), ..Self::new() }
    }

    /// Ids of each acknowledged submission, in order.
    pub fn batches(&self) -> Vec<Vec<u64>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches().iter().map(Vec::len).collect()
    }
}

impl DocumentStore for RecordingStore {
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        self.inner.init()
    }

    fn insert_many(
        &self,
        records: &[Record],
    ) -> Pin<Box<dyn Future<Output = Result<InsertAck, StoreError>> + Send + '_>> {
        let attempt = {
            let mut a = self.attempts.lock().unwrap();
            *a += 1;
            *a
        };
        if self.fail_on == Some(attempt) {
            return Box::pin(async move { Err(StoreError::unavailable(format!("injected failure on insert {attempt}"))) });
        }

        let ids: Vec<u64> = records.iter().map(|r| r.record_id).collect();
        let records = records.to_vec();
        Box::pin(async move {
            let ack = self.inner.insert_many(&records).await?;
            self.batches.lock().unwrap().push(ids);
            Ok(ack)
        })
    }

    fn find(
        &self,
        query: &FindQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredRecord>, StoreError>> + Send + '_>> {
        self.inner.find(query)
    }

    fn find_one(
        &self,
        filter: &RecordFilter,
    ) -> Pin<Box<dyn Future<Output = Result<Option<StoredRecord>, StoreError>> + Send + '_>> {
        self.inner.find_one(filter)
    }

    fn update_one(
        &self,
        filter: &RecordFilter,
        patch: &RecordPatch,
    ) -> Pin<Box<dyn Future<Output = Result<UpdateAck, StoreError>> + Send + '_>> {
        self.inner.update_one(filter, patch)
    }

    fn delete_many(
        &self,
        filter: &RecordFilter,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>> {
        self.inner.delete_many(filter)
    }

    fn count_documents(
        &self,
        filter: &RecordFilter,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>> {
        self.inner.count_documents(filter)
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        self.inner.close()
    }
}
