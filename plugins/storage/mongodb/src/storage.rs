use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};

use docstore_api::{
    DocumentStore, FindQuery, InsertAck, Record, RecordFilter, RecordPatch, StoreError,
    StoredRecord, UpdateAck,
};

use super::config::MongoStoreConfig;
use super::convert::{filter_to_document, patch_to_update, sort_to_document, RecordDoc};
use super::error::driver_err;

// ════════════════════════════════════════════════════════════════
//  MongoStore
// ════════════════════════════════════════════════════════════════

/// MongoDB collection backend.
///
/// The `Client` owns the driver's connection pool; one `MongoStore` is
/// opened per process and closed explicitly at shutdown.
pub struct MongoStore {
    client: Client,
    database: String,
    collection: Collection<RecordDoc>,
}

impl MongoStore {
    /// Parse the connection string and build the client. Does not touch
    /// the network; call `init()` to verify connectivity.
    pub async fn connect(config: &MongoStoreConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(driver_err("parse uri"))?;
        if config.app_name.is_some() {
            options.app_name = config.app_name.clone();
        }
        if let Some(ms) = config.connect_timeout_ms {
            options.connect_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = config.server_selection_timeout_ms {
            options.server_selection_timeout = Some(Duration::from_millis(ms));
        }

        let client = Client::with_options(options).map_err(driver_err("client"))?;
        let collection = client
            .database(&config.database)
            .collection::<RecordDoc>(&config.collection);

        Ok(Self {
            client,
            database: config.database.clone(),
            collection,
        })
    }

    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection.name())
    }
}

impl DocumentStore for MongoStore {
    fn init(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async {
            self.client
                .database(&self.database)
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(driver_err("ping"))?;
            tracing::debug!(ns = %self.namespace(), "mongodb reachable");
            Ok(())
        })
    }

    fn insert_many(
        &self,
        records: &[Record],
    ) -> Pin<Box<dyn Future<Output = Result<InsertAck, StoreError>> + Send + '_>> {
        let docs = records.iter().map(RecordDoc::from_record).collect::<Result<Vec<_>, _>>();
        Box::pin(async move {
            let docs = docs?;
            let result = self
                .collection
                .insert_many(docs)
                .await
                .map_err(driver_err("insert_many"))?;
            Ok(InsertAck { inserted: result.inserted_ids.len() as u64 })
        })
    }

    fn find(
        &self,
        query: &FindQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredRecord>, StoreError>> + Send + '_>> {
        let query = query.clone();
        Box::pin(async move {
            let filter = filter_to_document(&query.filter)?;
            let mut action = self.collection.find(filter);
            if let Some((field, order)) = query.sort {
                action = action.sort(sort_to_document(field, order));
            }
            if let Some(limit) = query.limit {
                let limit = i64::try_from(limit)
                    .map_err(|_| StoreError::invalid_request(format!("find: limit {limit} too large")))?;
                action = action.limit(limit);
            }

            let cursor = action.await.map_err(driver_err("find"))?;
            let docs: Vec<RecordDoc> = cursor.try_collect().await.map_err(driver_err("find cursor"))?;
            docs.into_iter().map(RecordDoc::into_stored).collect()
        })
    }

    fn find_one(
        &self,
        filter: &RecordFilter,
    ) -> Pin<Box<dyn Future<Output = Result<Option<StoredRecord>, StoreError>> + Send + '_>> {
        let filter = filter_to_document(filter);
        Box::pin(async move {
            let doc = self
                .collection
                .find_one(filter?)
                .await
                .map_err(driver_err("find_one"))?;
            doc.map(RecordDoc::into_stored).transpose()
        })
    }

    fn update_one(
        &self,
        filter: &RecordFilter,
        patch: &RecordPatch,
    ) -> Pin<Box<dyn Future<Output = Result<UpdateAck, StoreError>> + Send + '_>> {
        let filter = filter_to_document(filter);
        let update = patch_to_update(patch);
        Box::pin(async move {
            let result = self
                .collection
                .update_one(filter?, update)
                .await
                .map_err(driver_err("update_one"))?;
            Ok(UpdateAck {
                matched: result.matched_count,
                modified: result.modified_count,
            })
        })
    }

    fn delete_many(
        &self,
        filter: &RecordFilter,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>> {
        let filter = filter_to_document(filter);
        Box::pin(async move {
            let result = self
                .collection
                .delete_many(filter?)
                .await
                .map_err(driver_err("delete_many"))?;
            Ok(result.deleted_count)
        })
    }

    fn count_documents(
        &self,
        filter: &RecordFilter,
    ) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>> {
        let filter = filter_to_document(filter);
        Box::pin(async move {
            self.collection
                .count_documents(filter?)
                .await
                .map_err(driver_err("count_documents"))
        })
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async {
            self.client.clone().shutdown().await;
            tracing::debug!(ns = %self.namespace(), "mongodb client shut down");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use docstore_api::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn malformed_uri_is_config_error() {
        let config = MongoStoreConfig {
            uri: "mongo://x".into(),
            ..MongoStoreConfig::default()
        };
        let err = MongoStore::connect(&config).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.message().starts_with("parse uri:"), "{err}");
    }

    #[tokio::test]
    async fn connect_does_not_touch_network() {
        let config = MongoStoreConfig {
            uri: "mongodb://127.0.0.1:1/".into(),
            database: "bench".into(),
            collection: "people".into(),
            server_selection_timeout_ms: Some(50),
            ..MongoStoreConfig::default()
        };
        let store = MongoStore::connect(&config).await.unwrap();
        assert_eq!(store.namespace(), "bench.people");
    }
}
