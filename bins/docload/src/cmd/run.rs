use std::sync::Arc;

use batch_loader::RecordService;
use docstore_api::DocumentStore;

use super::config::Effective;
use super::error::DocloadError;
use super::store::open_store;

// ═══════════════════════════════════════════════════════════════
//  Main dispatch
// ═══════════════════════════════════════════════════════════════

/// Open the store, run the fixed operation sequence, close the store.
///
/// The store is closed on every path once it has been opened; the
/// sequence error (if any) wins over a close error.
pub async fn run(eff: &Effective) -> Result<(), DocloadError> {
    let store = open_store(eff).await?;

    let result = run_sequence(eff, store.clone()).await;

    let closed = store.close().await;
    match closed {
        Ok(()) => tracing::info!("store connection closed"),
        Err(ref e) => tracing::warn!(error = %e, "error closing store"),
    }

    result?;
    closed?;
    Ok(())
}

async fn run_sequence(eff: &Effective, store: Arc<dyn DocumentStore>) -> Result<(), DocloadError> {
    store.init().await?;

    let service = RecordService::new(store);

    let start = std::time::Instant::now();
    let summary = service
        .insert_records(eff.plan.total(), eff.plan.batch_size())
        .await?;
    let elapsed = start.elapsed();
    tracing::info!(
        records = summary.submitted,
        batches = summary.batches,
        elapsed_s = format_args!("{:.1}", elapsed.as_secs_f64()),
        rate = format_args!("{:.1}", summary.submitted as f64 / elapsed.as_secs_f64().max(f64::EPSILON)),
        "insert complete"
    );

    service.delete_latest_10().await?;
    service.fetch_record(eff.fetch_id).await?;
    service.update_record(eff.fetch_id, &eff.new_name).await?;
    service.count_records().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use batch_loader::LoadPlan;
    use storage_memory::MemoryStoreConfig;
    use storage_mongodb::MongoStoreConfig;

    use super::super::config::Backend;
    use super::*;

    fn memory_eff(total: u64, batch_size: usize, max_documents: Option<usize>) -> Effective {
        Effective {
            backend: Backend::Memory,
            plan: LoadPlan::new(total, batch_size).unwrap(),
            fetch_id: 5,
            new_name: "Updated_User_5".into(),
            mongodb: MongoStoreConfig::default(),
            memory: MemoryStoreConfig { max_documents },
        }
    }

    #[tokio::test]
    async fn sequence_runs_against_memory_store() {
        run(&memory_eff(120, 25, None)).await.unwrap();
    }

    #[tokio::test]
    async fn insert_failure_is_reported() {
        // Third batch overflows the collection.
        let err = run(&memory_eff(120, 25, Some(60))).await.unwrap_err();
        match err {
            DocloadError::Loader(batch_loader::LoaderError::Batch { batch, committed, .. }) => {
                assert_eq!(batch, 3);
                assert_eq!(committed, 50);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
