//! Core domain logic for the book library.
//! This crate is the single source of truth for record invariants.

pub mod clock;
pub mod codec;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod search;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{decode, encode, CodecError};
pub use db::{DbError, SqliteKvStore};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKvStore};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::book::{Book, BookDraft, BookField, BookId, BookValidationError};
pub use model::seed::starter_books;
pub use search::filter_books;
pub use service::library_service::{ConfirmOptions, LibraryService, Presenter, Severity};
pub use store::{
    BookStore, ErrorKind, FlushReport, InitOutcome, Lookup, PersistScheduler, SeedReason,
    StoreConfig, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
