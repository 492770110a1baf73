use crate::loader::LoadPlan;

// ═══════════════════════════════════════════════════════════════
//  Events
// ═══════════════════════════════════════════════════════════════

/// Emitted after each acknowledged bulk insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchEvent {
    /// 1-based submission index.
    pub batch: u64,
    /// Records in this submission.
    pub size: usize,
    /// Records submitted so far, this batch included.
    pub submitted: u64,
    pub total: u64,
    /// `false` for the trailing remainder smaller than `batch_size`.
    pub full: bool,
}

/// Outcome of a completed load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub batches: u64,
    pub submitted: u64,
    /// Sum of the store's inserted counts.
    pub acknowledged: u64,
}

// ═══════════════════════════════════════════════════════════════
//  Observer
// ═══════════════════════════════════════════════════════════════

/// Receives progress from the loader. Purely observational: nothing an
/// observer does affects what gets submitted.
pub trait ProgressObserver: Send + Sync {
    fn on_start(&self, _plan: &LoadPlan) {}

    fn on_batch(&self, event: &BatchEvent);

    fn on_finish(&self, _summary: &LoadSummary) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(&BatchEvent) + Send + Sync,
{
    fn on_batch(&self, event: &BatchEvent) {
        self(event)
    }
}

/// Default observer: structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_start(&self, plan: &LoadPlan) {
        tracing::info!(
            total = plan.total(),
            batch_size = plan.batch_size(),
            batches = plan.batch_count(),
            "starting insert"
        );
    }

    fn on_batch(&self, event: &BatchEvent) {
        tracing::info!(
            batch = event.batch,
            size = event.size,
            submitted = event.submitted,
            total = event.total,
            "inserted batch"
        );
    }

    fn on_finish(&self, summary: &LoadSummary) {
        tracing::info!(
            batches = summary.batches,
            submitted = summary.submitted,
            acknowledged = summary.acknowledged,
            "finished inserting"
        );
    }
}
