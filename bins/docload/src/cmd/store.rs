use std::sync::Arc;

use docstore_api::DocumentStore;
use storage_memory::MemoryStore;
use storage_mongodb::MongoStore;

use super::config::{Backend, Effective};
use super::error::DocloadError;

/// Build the store handle for the configured backend. No network I/O
/// happens here; connectivity is checked by `init()`.
pub async fn open_store(eff: &Effective) -> Result<Arc<dyn DocumentStore>, DocloadError> {
    let store: Arc<dyn DocumentStore> = match eff.backend {
        Backend::Mongodb => {
            let store = MongoStore::connect(&eff.mongodb).await?;
            tracing::info!(ns = %store.namespace(), "opened mongodb store");
            Arc::new(store)
        }
        Backend::Memory => {
            tracing::info!(max_documents = ?eff.memory.max_documents, "opened memory store");
            Arc::new(MemoryStore::new(eff.memory.clone()))
        }
    };
    Ok(store)
}
