use chrono::{DateTime, Utc};

use docstore_api::Record;

pub fn record_name(record_id: u64) -> String {
    format!("User_{record_id}")
}

pub fn record_email(record_id: u64) -> String {
    format!("user_{record_id}@example.com")
}

/// Build the synthetic record for `record_id`. Everything except
/// `created_at` is a pure function of the id.
pub fn synthesize(record_id: u64, created_at: DateTime<Utc>) -> Record {
    Record {
        record_id,
        name: record_name(record_id),
        email: record_email(record_id),
        created_at,
    }
}
