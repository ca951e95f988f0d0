//! Record codec for durable storage values.
//!
//! # Responsibility
//! - Serialize `Book` records and id lists to JSON strings.
//! - Revive `createdAt` / `updatedAt` into timestamps on decode.
//!
//! # Invariants
//! - Timestamps are written as RFC 3339 UTC with millisecond precision.
//! - `decode(encode(book)) == book` for every valid record.
//! - Decoded records must pass `Book::validate()`.

use crate::model::book::{Book, BookId, BookValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    Invalid(BookValidationError),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed record json: {err}"),
            Self::Invalid(err) => write!(f, "record violates invariants: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<BookValidationError> for CodecError {
    fn from(value: BookValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Serializes one record into its stored string form.
pub fn encode(book: &Book) -> Result<String, CodecError> {
    Ok(serde_json::to_string(book)?)
}

/// Parses one stored record, reviving its timestamp fields.
pub fn decode(raw: &str) -> Result<Book, CodecError> {
    let book: Book = serde_json::from_str(raw)?;
    book.validate()?;
    Ok(book)
}

/// Serializes the persisted identifier list.
pub fn encode_ids(ids: &[BookId]) -> Result<String, CodecError> {
    Ok(serde_json::to_string(ids)?)
}

/// Parses the persisted identifier list.
pub fn decode_ids(raw: &str) -> Result<Vec<BookId>, CodecError> {
    Ok(serde_json::from_str(raw)?)
}

/// Serde adapter for `DateTime<Utc>` as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub(crate) mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|err| de::Error::custom(format!("invalid timestamp `{raw}`: {err}")))
    }
}
