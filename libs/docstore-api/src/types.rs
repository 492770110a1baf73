use chrono::{DateTime, Utc};

// ════════════════════════════════════════════════════════════════
//  Record
// ════════════════════════════════════════════════════════════════

/// Synthetic document unit written by the batch loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Logical id, dense 1..N within one load run.
    pub record_id: u64,
    pub name: String,
    pub email: String,
    /// Generation time (UTC). Sole sort key for "latest" queries.
    pub created_at: DateTime<Utc>,
}

/// Store-assigned internal identity of a document (MongoDB `_id`).
///
/// Opaque to callers: only ever obtained from a read and handed back
/// to the same store in an `IdIn` filter. Each backend picks its own
/// textual encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record as read back from the store, with its internal identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: DocId,
    pub record: Record,
}

// ════════════════════════════════════════════════════════════════
//  Filters / queries
// ════════════════════════════════════════════════════════════════

/// Document selector. Deliberately closed: only the predicates the
/// loader operations need.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordFilter {
    /// Every document in the collection.
    #[default]
    All,
    /// `record_id == id`.
    RecordId(u64),
    /// Internal identity in the given set.
    IdIn(Vec<DocId>),
}

impl RecordFilter {
    /// Evaluate the filter against one stored document.
    pub fn matches(&self, doc: &StoredRecord) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::RecordId(id) => doc.record.record_id == *id,
            RecordFilter::IdIn(ids) => ids.contains(&doc.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    RecordId,
}

impl SortField {
    /// Field name as stored in the document.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::RecordId => "record_id",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Parameters of a `find` call.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: RecordFilter,
    /// Single sort key. No implicit secondary order is applied.
    pub sort: Option<(SortField, SortOrder)>,
    pub limit: Option<usize>,
}

impl FindQuery {
    /// The `n` documents with the most recent `created_at`.
    pub fn latest(n: usize) -> Self {
        Self {
            filter: RecordFilter::All,
            sort: Some((SortField::CreatedAt, SortOrder::Desc)),
            limit: Some(n),
        }
    }
}

/// Change applied by `update_one`. Only the display name is mutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPatch {
    pub name: String,
}

impl RecordPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ════════════════════════════════════════════════════════════════
//  Acknowledgements
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertAck {
    pub inserted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateAck {
    pub matched: u64,
    pub modified: u64,
}
