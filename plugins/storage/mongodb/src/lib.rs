mod config;
mod convert;
mod error;
mod storage;

pub use config::MongoStoreConfig;
pub use storage::MongoStore;
