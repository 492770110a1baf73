use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

use docstore_api::{
    DocId, Record, RecordFilter, RecordPatch, SortField, SortOrder, StoreError, StoredRecord,
};

// ═══════════════════════════════════════════════════════════════
//  Wire document
// ═══════════════════════════════════════════════════════════════

/// A record as it sits in the collection. The typed collection handle
/// serializes this directly; `_id` is left to the server on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RecordDoc {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Bson>,
    pub record_id: i64,
    pub name: String,
    pub email: String,
    pub created_at: BsonDateTime,
}

fn record_id_to_bson(record_id: u64) -> Result<i64, StoreError> {
    i64::try_from(record_id)
        .map_err(|_| StoreError::invalid_request(format!("record_id {record_id} does not fit in int64")))
}

impl RecordDoc {
    pub fn from_record(record: &Record) -> Result<Self, StoreError> {
        Ok(Self {
            id: None,
            record_id: record_id_to_bson(record.record_id)?,
            name: record.name.clone(),
            email: record.email.clone(),
            created_at: BsonDateTime::from_millis(record.created_at.timestamp_millis()),
        })
    }

    pub fn into_stored(self) -> Result<StoredRecord, StoreError> {
        let id = self
            .id
            .ok_or_else(|| StoreError::decode("document has no _id"))
            .and_then(doc_id_from_bson)?;
        let record_id = u64::try_from(self.record_id)
            .map_err(|_| StoreError::decode(format!("negative record_id {}", self.record_id)))?;
        let millis = self.created_at.timestamp_millis();
        let created_at: DateTime<Utc> = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| StoreError::decode(format!("created_at out of range: {millis}")))?;

        Ok(StoredRecord {
            id,
            record: Record {
                record_id,
                name: self.name,
                email: self.email,
                created_at,
            },
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  _id ↔ DocId
// ═══════════════════════════════════════════════════════════════

// Any `_id` type is carried as its canonical extended JSON, so ObjectIds,
// strings and numbers written by other tools all round-trip.

pub(crate) fn doc_id_from_bson(id: Bson) -> Result<DocId, StoreError> {
    serde_json::to_string(&id.into_canonical_extjson())
        .map(DocId::new)
        .map_err(|e| StoreError::decode(format!("_id: {e}")))
}

pub(crate) fn doc_id_to_bson(id: &DocId) -> Result<Bson, StoreError> {
    let invalid = |e: &dyn std::fmt::Display| {
        StoreError::invalid_request(format!("'{id}' is not a MongoDB document id: {e}"))
    };
    let value: serde_json::Value = serde_json::from_str(id.as_str()).map_err(|e| invalid(&e))?;
    Bson::try_from(value).map_err(|e| invalid(&e))
}

// ═══════════════════════════════════════════════════════════════
//  Filters / sort / patch
// ═══════════════════════════════════════════════════════════════

pub(crate) fn filter_to_document(filter: &RecordFilter) -> Result<Document, StoreError> {
    match filter {
        RecordFilter::All => Ok(Document::new()),
        RecordFilter::RecordId(id) => Ok(doc! { "record_id": record_id_to_bson(*id)? }),
        RecordFilter::IdIn(ids) => {
            let ids = ids.iter().map(doc_id_to_bson).collect::<Result<Vec<_>, _>>()?;
            Ok(doc! { "_id": { "$in": ids } })
        }
    }
}

pub(crate) fn sort_to_document(field: SortField, order: SortOrder) -> Document {
    let direction = match order {
        SortOrder::Asc => 1,
        SortOrder::Desc => -1,
    };
    let mut sort = Document::new();
    sort.insert(field.as_str(), direction);
    sort
}

pub(crate) fn patch_to_update(patch: &RecordPatch) -> Document {
    doc! { "$set": { "name": patch.name.as_str() } }
}
