//! Search-as-you-type filtering.
//!
//! # Responsibility
//! - Match records against a free-text query on title and author.
//!
//! # Invariants
//! - Matching is case-insensitive substring matching.
//! - A blank query matches everything.
//! - Result order follows input order.

use crate::model::book::Book;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Lowercases the query and collapses whitespace runs to single spaces.
pub fn normalize_query(query: &str) -> String {
    WHITESPACE_RE
        .replace_all(query.trim(), " ")
        .to_lowercase()
}

/// Returns the books whose title or author contains `query`.
pub fn filter_books(books: &[Book], query: &str) -> Vec<Book> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return books.to_vec();
    }

    books
        .iter()
        .filter(|book| {
            book.title.to_lowercase().contains(&needle)
                || book.author.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
