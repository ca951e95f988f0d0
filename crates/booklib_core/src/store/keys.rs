//! Durable store key layout.

/// Integer schema stamp of the stored record format.
pub const VERSION_KEY: &str = "books_version";
/// JSON array of persisted ids, in insertion order.
pub const IDS_KEY: &str = "book_ids";
const RECORD_KEY_PREFIX: &str = "book_";

pub fn record_key(id: &str) -> String {
    format!("{RECORD_KEY_PREFIX}{id}")
}
