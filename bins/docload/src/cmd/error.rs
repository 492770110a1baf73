#[derive(Debug, thiserror::Error)]
pub enum DocloadError {
    #[error("config: {0}")]
    Config(String),

    #[error("store: {0}")]
    Store(#[from] docstore_api::StoreError),

    #[error("{0}")]
    Loader(#[from] batch_loader::LoaderError),
}
