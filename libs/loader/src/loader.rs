use std::sync::Arc;

use docstore_api::{now_utc, DocumentStore, Record};

use crate::error::LoaderError;
use crate::generate::synthesize;
use crate::progress::{BatchEvent, LoadSummary, ProgressObserver, TracingObserver};

pub const DEFAULT_TOTAL: u64 = 1_000_000;
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

// ═══════════════════════════════════════════════════════════════
//  LoadPlan
// ═══════════════════════════════════════════════════════════════

/// How many records to generate and how many go into one bulk insert.
/// Only built through [`LoadPlan::new`], so `batch_size` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPlan {
    total: u64,
    batch_size: usize,
}

impl Default for LoadPlan {
    fn default() -> Self {
        Self {
            total: DEFAULT_TOTAL,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl LoadPlan {
    pub fn new(total: u64, batch_size: usize) -> Result<Self, LoaderError> {
        if batch_size == 0 {
            return Err(LoaderError::InvalidPlan("batch_size must be at least 1".into()));
        }
        Ok(Self { total, batch_size })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of bulk inserts the plan produces: `ceil(total / batch_size)`.
    pub fn batch_count(&self) -> u64 {
        self.total.div_ceil(self.batch_size as u64)
    }
}

// ═══════════════════════════════════════════════════════════════
//  BatchLoader
// ═══════════════════════════════════════════════════════════════

/// Generates `plan.total` records and writes them in `plan.batch_size`
/// chunks.
///
/// Flush policy: submit when the pending buffer holds exactly
/// `batch_size` records, then once more for a non-empty remainder after
/// the last id. Every id in `1..=total` is submitted exactly once and the
/// buffer never holds more than `batch_size` records.
///
/// A failed submission aborts the run. Batches acknowledged before it are
/// not rolled back.
pub struct BatchLoader {
    store: Arc<dyn DocumentStore>,
    observer: Arc<dyn ProgressObserver>,
}

impl BatchLoader {
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

    pub async fn run(&self, plan: LoadPlan) -> Result<LoadSummary, LoaderError> {
        self.observer.on_start(&plan);

        let capacity = usize::try_from(plan.total).map_or(plan.batch_size, |t| t.min(plan.batch_size));
        let mut pending: Vec<Record> = Vec::with_capacity(capacity);
        let mut summary = LoadSummary::default();

        for record_id in 1..=plan.total {
            pending.push(synthesize(record_id, now_utc()));
            if pending.len() == plan.batch_size {
                self.submit(&plan, &mut pending, &mut summary).await?;
            }
        }

        if !pending.is_empty() {
            self.submit(&plan, &mut pending, &mut summary).await?;
        }

        self.observer.on_finish(&summary);
        Ok(summary)
    }

    /// One bulk insert of the whole buffer, then clear it.
    async fn submit(
        &self,
        plan: &LoadPlan,
        pending: &mut Vec<Record>,
        summary: &mut LoadSummary,
    ) -> Result<(), LoaderError> {
        let batch = summary.batches + 1;
        let size = pending.len();

        let ack = self
            .store
            .insert_many(pending.as_slice())
            .await
            .map_err(|source| LoaderError::Batch {
                batch,
                committed: summary.submitted,
                source,
            })?;

        if ack.inserted != size as u64 {
            tracing::warn!(batch, size, inserted = ack.inserted, "store acknowledged a different count");
        }

        summary.batches = batch;
        summary.submitted += size as u64;
        summary.acknowledged += ack.inserted;
        pending.clear();

        self.observer.on_batch(&BatchEvent {
            batch,
            size,
            submitted: summary.submitted,
            total: plan.total,
            full: size == plan.batch_size,
        });
        Ok(())
    }
}
