//! Library use-case service.
//!
//! # Responsibility
//! - Drive add / toggle / delete / search flows against `BookStore`.
//! - Re-render and notify the presentation layer after each flow.
//! - Ask for confirmation before destructive deletion.
//!
//! # Invariants
//! - The service never renders on its own; all output goes through
//!   `Presenter`.
//! - Every failed flow produces exactly one `Severity::Error` notification
//!   and returns the store error unchanged.

use crate::clock::Clock;
use crate::kv::KeyValueStore;
use crate::model::book::Book;
use crate::store::{BookStore, FlushReport, InitOutcome, StoreResult};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// Labels for a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmOptions {
    pub confirm_text: String,
    pub cancel_text: String,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            confirm_text: "Confirm".to_string(),
            cancel_text: "Cancel".to_string(),
        }
    }
}

/// Presentation-layer contract.
pub trait Presenter {
    /// Redraws the display surface with `books`.
    fn render(&mut self, books: &[Book]);
    fn notify(&mut self, title: &str, message: &str, severity: Severity);
    /// Returns `true` when the user confirmed.
    fn confirm(&mut self, title: &str, message: &str, options: &ConfirmOptions) -> bool;
}

/// Use-case facade over one store and one presenter.
pub struct LibraryService<S: KeyValueStore, C: Clock, P: Presenter> {
    store: BookStore<S, C>,
    presenter: P,
}

impl<S: KeyValueStore, C: Clock, P: Presenter> LibraryService<S, C, P> {
    pub fn new(store: BookStore<S, C>, presenter: P) -> Self {
        Self { store, presenter }
    }

    /// Initializes the store. Does not render.
    pub fn start(&mut self) -> InitOutcome {
        self.store.initialize()
    }

    /// Renders the full list.
    pub fn show_all(&mut self) {
        let books = self.store.list_all();
        self.presenter.render(&books);
    }

    /// Renders records matching `query`; a blank query renders everything.
    pub fn search(&mut self, query: &str) -> Vec<Book> {
        let books = self.store.search(query);
        self.presenter.render(&books);
        books
    }

    pub fn add_book(
        &mut self,
        title: &str,
        author: &str,
        is_read: bool,
        num_of_pages: i64,
    ) -> StoreResult<Book> {
        match self.store.add(title, author, is_read, num_of_pages) {
            Ok(book) => {
                self.show_all();
                self.presenter.notify(
                    "Success!",
                    &format!("\"{}\" has been added to your library.", book.title),
                    Severity::Success,
                );
                Ok(book)
            }
            Err(err) => {
                self.presenter.notify(
                    "Error",
                    &format!("Unable to add book: {err}"),
                    Severity::Error,
                );
                Err(err)
            }
        }
    }

    pub fn toggle_status(&mut self, id: &str) -> StoreResult<Book> {
        match self.store.toggle_read_status(id) {
            Ok(book) => {
                self.show_all();
                let (mark, action) = if book.is_read {
                    ("✓", "marked as read")
                } else {
                    ("○", "marked as unread")
                };
                self.presenter.notify(
                    "Status Updated!",
                    &format!("{mark} \"{}\" {action}.", book.title),
                    Severity::Success,
                );
                Ok(book)
            }
            Err(err) => {
                self.presenter.notify(
                    "Error",
                    &format!("Unable to update status: {err}"),
                    Severity::Error,
                );
                Err(err)
            }
        }
    }

    /// Sets an explicit read status.
    pub fn set_status(&mut self, id: &str, is_read: bool) -> StoreResult<Book> {
        let current = match self.store.find_by_id(id) {
            Ok(book) => book,
            Err(err) => {
                self.presenter.notify(
                    "Error",
                    &format!("Unable to update status: {err}"),
                    Severity::Error,
                );
                return Err(err);
            }
        };
        if current.is_read == is_read {
            self.presenter.notify(
                "No Change",
                &format!("\"{}\" already has this status.", current.title),
                Severity::Info,
            );
            return Ok(current);
        }
        self.toggle_status(id)
    }

    /// Deletes after confirmation.
    ///
    /// Returns `Ok(None)` when the user cancelled.
    pub fn delete_book(&mut self, id: &str) -> StoreResult<Option<Book>> {
        let book = match self.store.find_by_id(id) {
            Ok(book) => book,
            Err(err) => {
                self.notify_delete_failure(&err);
                return Err(err);
            }
        };

        let options = ConfirmOptions {
            confirm_text: "Delete".to_string(),
            cancel_text: "Cancel".to_string(),
        };
        let confirmed = self.presenter.confirm(
            "Delete Book",
            &format!(
                "Are you sure you want to delete \"{}\" by {}? This action cannot be undone.",
                book.title, book.author
            ),
            &options,
        );
        if !confirmed {
            return Ok(None);
        }

        match self.store.delete(id) {
            Ok(removed) => {
                self.show_all();
                self.presenter.notify(
                    "Success!",
                    &format!("\"{}\" has been removed from your library.", removed.title),
                    Severity::Success,
                );
                Ok(Some(removed))
            }
            Err(err) => {
                self.notify_delete_failure(&err);
                Err(err)
            }
        }
    }

    /// Event-loop hook forwarding to `BookStore::poll`.
    pub fn tick(&mut self) -> Option<FlushReport> {
        self.store.poll()
    }

    pub fn store(&self) -> &BookStore<S, C> {
        &self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Flushes pending writes and returns the durable backend.
    pub fn shutdown(self) -> S {
        self.store.shutdown()
    }

    fn notify_delete_failure(&mut self, err: &crate::store::StoreError) {
        self.presenter.notify(
            "Error",
            &format!("Unable to delete book: {err}"),
            Severity::Error,
        );
    }
}
