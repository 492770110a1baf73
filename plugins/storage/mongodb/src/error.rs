use mongodb::error::{Error, ErrorKind};

use docstore_api::StoreError;

/// Map a driver error for operation `op` onto the store taxonomy.
pub(crate) fn driver_err(op: &'static str) -> impl FnOnce(Error) -> StoreError {
    move |e| {
        let message = format!("{op}: {e}");
        match *e.kind {
            ErrorKind::InvalidArgument { .. } => StoreError::config(message),
            ErrorKind::BsonDeserialization(_) => StoreError::decode(message),
            ErrorKind::BsonSerialization(_) => StoreError::invalid_request(message),
            ErrorKind::Write(_) | ErrorKind::InsertMany(_) => StoreError::rejected(message),
            _ => StoreError::unavailable(message),
        }
    }
}
