pub mod error;
pub mod generate;
mod loader;
mod progress;
mod service;

pub use error::LoaderError;
pub use loader::{BatchLoader, LoadPlan, DEFAULT_BATCH_SIZE, DEFAULT_TOTAL};
pub use progress::{BatchEvent, LoadSummary, ProgressObserver, TracingObserver};
pub use service::{RecordService, LATEST_DELETE_COUNT};
