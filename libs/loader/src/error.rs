use docstore_api::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("invalid load plan: {0}")]
    InvalidPlan(String),

    /// A bulk insert failed. Earlier batches stay persisted.
    #[error("batch {batch} failed ({committed} records committed before it): {source}")]
    Batch { batch: u64, committed: u64, source: StoreError },

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

impl LoaderError {
    /// Underlying store error, if the failure came from the store.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            LoaderError::Batch { source, .. } => Some(source),
            LoaderError::Store(e) => Some(e),
            LoaderError::InvalidPlan(_) => None,
        }
    }
}
