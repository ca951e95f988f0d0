//! Store-level error model.

use crate::codec::CodecError;
use crate::kv::KvError;
use crate::model::book::{BookField, BookValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Coarse error category surfaced to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Conflict,
    NotFound,
    Storage,
}

/// Lookup key that produced a miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(String),
    Title(String),
}

impl Display for Lookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "book with ID \"{id}\" not found"),
            Self::Title(title) => write!(f, "book with title \"{title}\" not found"),
        }
    }
}

/// Error returned by `BookStore` operations.
#[derive(Debug)]
pub enum StoreError {
    /// Malformed or out-of-range input.
    InvalidArgument(BookValidationError),
    /// A live record already has this `(title, author)` pair.
    Conflict { title: String, author: String },
    NotFound(Lookup),
    Storage(KvError),
    Codec(CodecError),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) | Self::Codec(_) => ErrorKind::Storage,
        }
    }

    /// Field name for `InvalidArgument`, `None` otherwise.
    pub fn field(&self) -> Option<BookField> {
        match self {
            Self::InvalidArgument(err) => Some(err.field()),
            _ => None,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(err) => write!(f, "{}", err.message()),
            Self::Conflict { .. } => {
                write!(f, "A book with the same title and author already exists.")
            }
            Self::NotFound(lookup) => write!(f, "{lookup}."),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Conflict { .. } | Self::NotFound(_) => None,
        }
    }
}

impl From<BookValidationError> for StoreError {
    fn from(value: BookValidationError) -> Self {
        Self::InvalidArgument(value)
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Storage(value)
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}
