//! In-memory book store with debounced durable write-back.
//!
//! # Responsibility
//! - Own the authoritative working copy of all live records.
//! - Enforce validation and uniqueness before any mutation.
//! - Rehydrate from the durable store, or reseed from starter data.
//! - Persist creations/updates through the debounced scheduler and
//!   deletions synchronously.
//!
//! # Invariants
//! - Record ids and `(title, author)` pairs are unique among live records.
//! - A failed operation leaves memory unchanged.
//! - Durable-store failures inside `initialize()` and write-back passes are
//!   logged, never propagated.
//! - Lookups and the uniqueness check are case-sensitive exact matches.

mod config;
mod error;
mod keys;
mod scheduler;

pub use config::{StoreConfig, DEFAULT_DEBOUNCE, DEFAULT_STORE_VERSION};
pub use error::{ErrorKind, Lookup, StoreError, StoreResult};
pub use keys::{record_key, IDS_KEY, VERSION_KEY};
pub use scheduler::PersistScheduler;

use crate::clock::Clock;
use crate::codec::{decode, decode_ids, encode, encode_ids};
use crate::kv::KeyValueStore;
use crate::model::book::{
    validate_author, validate_id, validate_read_status, validate_title, Book, BookDraft, BookId,
};
use crate::search::filter_books;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Why `initialize()` fell back to starter data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedReason {
    MissingVersion,
    VersionMismatch { found: String },
    MissingIds,
    CorruptIds(String),
    Backend(String),
}

impl Display for SeedReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVersion => write!(f, "missing_version"),
            Self::VersionMismatch { found } => write!(f, "version_mismatch found={found}"),
            Self::MissingIds => write!(f, "missing_ids"),
            Self::CorruptIds(err) => write!(f, "corrupt_ids error={err}"),
            Self::Backend(err) => write!(f, "backend_error error={err}"),
        }
    }
}

/// Result of `initialize()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// Persisted state was compatible and loaded.
    Loaded {
        records: usize,
        /// Persisted ids dropped because their record was missing, corrupt or
        /// duplicated.
        discarded: Vec<BookId>,
    },
    /// Starter data replaced whatever was stored.
    Seeded { reason: SeedReason, records: usize },
}

/// Summary of one write-back pass.
#[derive(Debug, Default)]
pub struct FlushReport {
    /// Ids whose record was written, in collection order.
    pub written: Vec<BookId>,
    /// Whether `book_ids` was rewritten.
    pub ids_rewritten: bool,
    /// First failure; the remaining dirty ids stay pending.
    pub failure: Option<StoreError>,
}

impl FlushReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

struct LoadedState {
    books: Vec<Book>,
    persisted_ids: Vec<BookId>,
    discarded: Vec<BookId>,
}

/// Book record store over a durable key-value backend.
pub struct BookStore<S: KeyValueStore, C: Clock> {
    backend: S,
    clock: C,
    config: StoreConfig,
    books: Vec<Book>,
    /// Id list as last written to `book_ids`.
    persisted_ids: Vec<BookId>,
    scheduler: PersistScheduler,
}

impl<S: KeyValueStore, C: Clock> BookStore<S, C> {
    /// Creates an empty store. Call `initialize()` before use.
    pub fn new(backend: S, clock: C, config: StoreConfig) -> Self {
        let scheduler = PersistScheduler::new(config.debounce());
        Self {
            backend,
            clock,
            config,
            books: Vec::new(),
            persisted_ids: Vec::new(),
            scheduler,
        }
    }

    /// Loads persisted records, or reseeds from the starter data set.
    ///
    /// Never fails: incompatible or unreadable state triggers a reseed and
    /// is only reported through logs and the returned outcome. Pending
    /// unflushed changes from before the call are dropped.
    pub fn initialize(&mut self) -> InitOutcome {
        self.books.clear();
        self.persisted_ids.clear();
        self.scheduler.complete();

        match self.load_persisted() {
            Ok(state) => {
                let records = state.books.len();
                self.books = state.books;
                self.persisted_ids = state.persisted_ids;
                if !state.discarded.is_empty() {
                    // Compacts `book_ids` on the next pass.
                    self.scheduler.arm(self.clock.now());
                }
                info!(
                    "event=store_init module=store status=loaded records={} discarded={}",
                    records,
                    state.discarded.len()
                );
                InitOutcome::Loaded {
                    records,
                    discarded: state.discarded,
                }
            }
            Err(reason) => {
                warn!("event=store_init module=store status=reseed reason={reason}");
                self.reseed();
                InitOutcome::Seeded {
                    reason,
                    records: self.books.len(),
                }
            }
        }
    }

    /// Returns all records, newest `created_at` first.
    ///
    /// Ties keep insertion order.
    pub fn list_all(&self) -> Vec<Book> {
        let mut books = self.books.clone();
        books.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        books
    }

    /// Case-insensitive title/author search over `list_all()`.
    pub fn search(&self, query: &str) -> Vec<Book> {
        filter_books(&self.list_all(), query)
    }

    /// Validates and creates one record.
    ///
    /// # Errors
    /// - `InvalidArgument` for `title`, `author`, `numOfPages`, in that order.
    /// - `Conflict` when the `(title, author)` pair already exists.
    pub fn add(
        &mut self,
        title: &str,
        author: &str,
        is_read: bool,
        num_of_pages: i64,
    ) -> StoreResult<Book> {
        let draft = BookDraft::new(title, author, is_read, num_of_pages)?;
        self.add_draft(draft)
    }

    /// Creates one record from an untyped form payload.
    pub fn add_form(&mut self, form: &Value) -> StoreResult<Book> {
        let draft = BookDraft::from_form(form)?;
        self.add_draft(draft)
    }

    /// Creates one record from a validated draft.
    pub fn add_draft(&mut self, draft: BookDraft) -> StoreResult<Book> {
        if self
            .books
            .iter()
            .any(|book| book.same_work(draft.title(), draft.author()))
        {
            return Err(StoreError::Conflict {
                title: draft.title().to_string(),
                author: draft.author().to_string(),
            });
        }

        let id = self.allocate_id();
        let now = self.clock.now();
        let book = Book::from_draft(id, draft, now);
        self.books.push(book.clone());
        self.scheduler.mark_dirty(&book.id, now);

        debug!(
            "event=book_add module=store status=ok id={} records={}",
            book.id,
            self.books.len()
        );
        Ok(book)
    }

    pub fn find_by_id(&self, id: &str) -> StoreResult<Book> {
        validate_id(id)?;
        self.books
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(Lookup::Id(id.to_string())))
    }

    /// Returns the first record with exactly this title.
    pub fn find_by_title(&self, title: &str) -> StoreResult<Book> {
        validate_title(title)?;
        self.books
            .iter()
            .find(|book| book.title == title)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(Lookup::Title(title.to_string())))
    }

    /// Returns every record by exactly this author, in insertion order.
    ///
    /// An author without records yields an empty vector; only a blank
    /// author is an error.
    pub fn find_by_author(&self, author: &str) -> StoreResult<Vec<Book>> {
        validate_author(author)?;
        Ok(self
            .books
            .iter()
            .filter(|book| book.author == author)
            .cloned()
            .collect())
    }

    /// Sets read status, bumps `updated_at` and schedules persistence.
    pub fn update_read_status(&mut self, id: &str, is_read: bool) -> StoreResult<Book> {
        validate_id(id)?;
        let now = self.clock.now();
        let book = self
            .books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(|| StoreError::NotFound(Lookup::Id(id.to_string())))?;
        book.set_read_status(is_read, now);
        let updated = book.clone();
        self.scheduler.mark_dirty(&updated.id, now);

        debug!(
            "event=book_update module=store status=ok id={} is_read={}",
            updated.id, updated.is_read
        );
        Ok(updated)
    }

    /// `update_read_status` with an untyped status value.
    ///
    /// # Errors
    /// - `InvalidArgument("id")`, then `InvalidArgument("isRead")` when the
    ///   value is not a boolean, then `NotFound`.
    pub fn update_read_status_form(&mut self, id: &str, is_read: &Value) -> StoreResult<Book> {
        validate_id(id)?;
        let is_read = validate_read_status(is_read)?;
        self.update_read_status(id, is_read)
    }

    /// Flips read status.
    pub fn toggle_read_status(&mut self, id: &str) -> StoreResult<Book> {
        let current = self.find_by_id(id)?;
        self.update_read_status(id, !current.is_read)
    }

    /// Removes one record from memory and durable storage immediately.
    ///
    /// Returns the removed record's last state.
    ///
    /// # Errors
    /// - `InvalidArgument` / `NotFound` as for `find_by_id`.
    /// - `Storage` when `book_ids` cannot be rewritten; nothing is removed.
    pub fn delete(&mut self, id: &str) -> StoreResult<Book> {
        validate_id(id)?;
        let index = self
            .books
            .iter()
            .position(|book| book.id == id)
            .ok_or_else(|| StoreError::NotFound(Lookup::Id(id.to_string())))?;

        let remaining: Vec<BookId> = self
            .persisted_ids
            .iter()
            .filter(|persisted| persisted.as_str() != id)
            .cloned()
            .collect();
        if remaining.len() != self.persisted_ids.len() {
            let raw = encode_ids(&remaining)?;
            if let Err(err) = self.backend.set(IDS_KEY, &raw) {
                error!(
                    "event=book_delete module=store status=error id={} error_code=ids_write_failed error={}",
                    id, err
                );
                return Err(err.into());
            }
            self.persisted_ids = remaining;
        }

        // Orphaned record keys are unreachable once `book_ids` excludes them.
        if let Err(err) = self.backend.remove(&record_key(id)) {
            warn!(
                "event=book_delete module=store status=degraded id={} error_code=record_remove_failed error={}",
                id, err
            );
        }

        let removed = self.books.remove(index);
        self.scheduler.forget(id);
        debug!(
            "event=book_delete module=store status=ok id={} records={}",
            id,
            self.books.len()
        );
        Ok(removed)
    }

    /// Event-loop hook: runs the write-back pass once the quiet period ended.
    pub fn poll(&mut self) -> Option<FlushReport> {
        if self.scheduler.is_due(self.clock.now()) {
            Some(self.flush_now())
        } else {
            None
        }
    }

    /// Writes every dirty record and, when changed, the id list.
    ///
    /// Failures are logged and reported, never propagated. On failure the
    /// dirty set is kept so the next pass retries it.
    pub fn flush_now(&mut self) -> FlushReport {
        let mut report = FlushReport::default();

        let mut failure = None;
        for book in self
            .books
            .iter()
            .filter(|book| self.scheduler.is_dirty(&book.id))
        {
            let written = encode(book)
                .map_err(StoreError::from)
                .and_then(|raw| Ok(self.backend.set(&record_key(&book.id), &raw)?));
            if let Err(err) = written {
                error!(
                    "event=store_flush module=store status=error id={} written={} error={}",
                    book.id,
                    report.written.len(),
                    err
                );
                failure = Some(err);
                break;
            }
            report.written.push(book.id.clone());
        }
        if failure.is_some() {
            report.failure = failure;
            self.scheduler.disarm();
            return report;
        }

        let ids = self.live_ids();
        if ids != self.persisted_ids {
            let written = encode_ids(&ids)
                .map_err(StoreError::from)
                .and_then(|raw| Ok(self.backend.set(IDS_KEY, &raw)?));
            if let Err(err) = written {
                error!(
                    "event=store_flush module=store status=error error_code=ids_write_failed written={} error={}",
                    report.written.len(),
                    err
                );
                report.failure = Some(err);
                self.scheduler.disarm();
                return report;
            }
            self.persisted_ids = ids;
            report.ids_rewritten = true;
        }

        self.scheduler.complete();
        debug!(
            "event=store_flush module=store status=ok written={} ids_rewritten={}",
            report.written.len(),
            report.ids_rewritten
        );
        report
    }

    /// Flushes pending writes and hands back the durable backend.
    pub fn shutdown(mut self) -> S {
        if !self.scheduler.is_idle() {
            let report = self.flush_now();
            if let Some(err) = report.failure {
                warn!("event=store_shutdown module=store status=degraded error={err}");
            }
        }
        self.backend
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Number of records waiting for write-back.
    pub fn pending_writes(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn scheduler(&self) -> &PersistScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn allocate_id(&self) -> BookId {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.books.iter().any(|book| book.id == id) {
                return id;
            }
        }
    }

    fn live_ids(&self) -> Vec<BookId> {
        self.books.iter().map(|book| book.id.clone()).collect()
    }

    fn load_persisted(&self) -> Result<LoadedState, SeedReason> {
        let backend_err = |err: crate::kv::KvError| SeedReason::Backend(err.to_string());

        let version = self
            .backend
            .get(VERSION_KEY)
            .map_err(backend_err)?
            .ok_or(SeedReason::MissingVersion)?;
        if version.trim().parse::<u32>().ok() != Some(self.config.version()) {
            return Err(SeedReason::VersionMismatch { found: version });
        }

        let raw_ids = self
            .backend
            .get(IDS_KEY)
            .map_err(backend_err)?
            .ok_or(SeedReason::MissingIds)?;
        let persisted_ids =
            decode_ids(&raw_ids).map_err(|err| SeedReason::CorruptIds(err.to_string()))?;

        let mut books = Vec::with_capacity(persisted_ids.len());
        let mut discarded = Vec::new();
        for id in &persisted_ids {
            let Some(raw) = self.backend.get(&record_key(id)).map_err(backend_err)? else {
                warn!("event=store_load module=store status=discard id={id} reason=missing_record");
                discarded.push(id.clone());
                continue;
            };
            let book = match decode(&raw) {
                Ok(book) => book,
                Err(err) => {
                    warn!(
                        "event=store_load module=store status=discard id={id} reason=corrupt_record error={err}"
                    );
                    discarded.push(id.clone());
                    continue;
                }
            };
            if book.id != *id || !push_unique(&mut books, book) {
                warn!("event=store_load module=store status=discard id={id} reason=conflicting_record");
                discarded.push(id.clone());
            }
        }

        Ok(LoadedState {
            books,
            persisted_ids,
            discarded,
        })
    }

    fn reseed(&mut self) {
        let stale_ids = self
            .backend
            .get(IDS_KEY)
            .ok()
            .flatten()
            .and_then(|raw| decode_ids(&raw).ok())
            .unwrap_or_default();

        let mut books = Vec::with_capacity(self.config.seed().len());
        for book in self.config.seed().iter().cloned() {
            let id = book.id.clone();
            if book.validate().is_err() || !push_unique(&mut books, book) {
                warn!("event=store_seed module=store status=discard id={id} reason=invalid_seed");
            }
        }
        self.books = books;

        for id in stale_ids.iter().filter(|id| !self.books.iter().any(|book| &book.id == *id)) {
            if let Err(err) = self.backend.remove(&record_key(id)) {
                warn!("event=store_seed module=store status=degraded id={id} error_code=stale_remove_failed error={err}");
            }
        }

        match self.write_through() {
            Ok(()) => info!(
                "event=store_seed module=store status=ok records={} version={}",
                self.books.len(),
                self.config.version()
            ),
            Err(err) => error!(
                "event=store_seed module=store status=error records={} error={}",
                self.books.len(),
                err
            ),
        }
    }

    /// Writes every record, then the id list, then the version stamp.
    ///
    /// The stamp goes last so a partial write reseeds on the next start.
    fn write_through(&mut self) -> StoreResult<()> {
        for book in &self.books {
            self.backend.set(&record_key(&book.id), &encode(book)?)?;
        }
        let ids = self.live_ids();
        self.backend.set(IDS_KEY, &encode_ids(&ids)?)?;
        self.persisted_ids = ids;
        self.backend
            .set(VERSION_KEY, &self.config.version().to_string())?;
        Ok(())
    }
}

/// Appends `book` unless its id or `(title, author)` pair is already taken.
fn push_unique(books: &mut Vec<Book>, book: Book) -> bool {
    let taken = books
        .iter()
        .any(|existing| existing.id == book.id || existing.same_work(&book.title, &book.author));
    if taken {
        return false;
    }
    books.push(book);
    true
}
