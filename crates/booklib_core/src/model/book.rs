//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical record kept by the store.
//! - Validate creation input in a fixed rule order so the first violation
//!   is deterministic.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - `title` and `author` are non-empty after trimming.
//! - `num_of_pages` is strictly positive.
//! - `updated_at` is never earlier than `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of one record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type BookId = String;

/// Field names referenced by validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookField {
    Id,
    Title,
    Author,
    IsRead,
    NumOfPages,
    UpdatedAt,
}

impl BookField {
    /// Returns the external (serialized) field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Author => "author",
            Self::IsRead => "isRead",
            Self::NumOfPages => "numOfPages",
            Self::UpdatedAt => "updatedAt",
        }
    }
}

impl Display for BookField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First violated field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookValidationError {
    field: BookField,
    message: &'static str,
}

impl BookValidationError {
    fn new(field: BookField, message: &'static str) -> Self {
        Self { field, message }
    }

    /// Field that failed validation.
    pub fn field(&self) -> BookField {
        self.field
    }

    /// Human-readable rule description.
    pub fn message(&self) -> &'static str {
        self.message
    }
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}`: {}", self.field, self.message)
    }
}

impl Error for BookValidationError {}

/// Canonical library record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    /// Set once at creation, millisecond precision.
    #[serde(with = "crate::codec::iso_millis")]
    pub created_at: DateTime<Utc>,
    /// Bumped on every mutation.
    #[serde(with = "crate::codec::iso_millis")]
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub author: String,
    pub is_read: bool,
    pub num_of_pages: u32,
}

impl Book {
    pub(crate) fn from_draft(id: BookId, draft: BookDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            title: draft.title,
            author: draft.author,
            is_read: draft.is_read,
            num_of_pages: draft.num_of_pages,
        }
    }

    /// Sets read status and bumps `updated_at`.
    ///
    /// `updated_at` is clamped to `created_at` so a clock step backwards
    /// cannot break the timestamp ordering invariant.
    pub(crate) fn set_read_status(&mut self, is_read: bool, now: DateTime<Utc>) {
        self.is_read = is_read;
        self.updated_at = now.max(self.created_at);
    }

    /// Returns whether this record shares the uniqueness key `(title, author)`.
    ///
    /// Matching is case-sensitive and exact.
    pub fn same_work(&self, title: &str, author: &str) -> bool {
        self.title == title && self.author == author
    }

    /// Validates record-level invariants.
    ///
    /// Used on decoded records, which never went through `BookDraft`.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        validate_id(&self.id)?;
        validate_title(&self.title)?;
        validate_author(&self.author)?;
        if self.num_of_pages == 0 {
            return Err(BookValidationError::new(
                BookField::NumOfPages,
                PAGES_MESSAGE,
            ));
        }
        if self.updated_at < self.created_at {
            return Err(BookValidationError::new(
                BookField::UpdatedAt,
                "Updated timestamp must not precede the creation timestamp.",
            ));
        }
        Ok(())
    }
}

const PAGES_MESSAGE: &str = "Number of pages must be a positive number.";

/// Validated creation input.
///
/// Only constructible through the validating constructors, so holding a
/// draft means rules 1-4 already passed. Uniqueness is checked by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    title: String,
    author: String,
    is_read: bool,
    num_of_pages: u32,
}

impl BookDraft {
    /// Builds a draft from typed values.
    ///
    /// # Errors
    /// - `title` then `author` then `numOfPages`, first violation wins.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        is_read: bool,
        num_of_pages: i64,
    ) -> Result<Self, BookValidationError> {
        let title = title.into();
        let author = author.into();
        validate_title(&title)?;
        validate_author(&author)?;
        let num_of_pages = validate_num_of_pages(num_of_pages)?;
        Ok(Self {
            title,
            author,
            is_read,
            num_of_pages,
        })
    }

    /// Builds a draft from an untyped form payload.
    ///
    /// Expects an object with `title`, `author`, `isRead` and `numOfPages`.
    /// Missing keys fail the same way as values of the wrong type.
    ///
    /// # Errors
    /// - `title` -> `author` -> `isRead` -> `numOfPages`, first violation wins.
    pub fn from_form(form: &Value) -> Result<Self, BookValidationError> {
        let title = form.get("title").and_then(Value::as_str).unwrap_or("");
        validate_title(title)?;
        let author = form.get("author").and_then(Value::as_str).unwrap_or("");
        validate_author(author)?;
        let is_read = validate_read_status(form.get("isRead").unwrap_or(&Value::Null))?;
        let num_of_pages =
            validate_num_of_pages_value(form.get("numOfPages").unwrap_or(&Value::Null))?;
        Ok(Self {
            title: title.to_string(),
            author: author.to_string(),
            is_read,
            num_of_pages,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn is_read(&self) -> bool {
        self.is_read
    }

    pub fn num_of_pages(&self) -> u32 {
        self.num_of_pages
    }
}

pub(crate) fn validate_id(id: &str) -> Result<(), BookValidationError> {
    if id.trim().is_empty() {
        return Err(BookValidationError::new(
            BookField::Id,
            "ID must be a non-empty string.",
        ));
    }
    Ok(())
}

pub(crate) fn validate_title(title: &str) -> Result<(), BookValidationError> {
    if title.trim().is_empty() {
        return Err(BookValidationError::new(
            BookField::Title,
            "Title must be a non-empty string.",
        ));
    }
    Ok(())
}

pub(crate) fn validate_author(author: &str) -> Result<(), BookValidationError> {
    if author.trim().is_empty() {
        return Err(BookValidationError::new(
            BookField::Author,
            "Author must be a non-empty string.",
        ));
    }
    Ok(())
}

pub(crate) fn validate_read_status(value: &Value) -> Result<bool, BookValidationError> {
    value.as_bool().ok_or(BookValidationError::new(
        BookField::IsRead,
        "Read status must be a boolean.",
    ))
}

fn validate_num_of_pages(num_of_pages: i64) -> Result<u32, BookValidationError> {
    match u32::try_from(num_of_pages) {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(BookValidationError::new(
            BookField::NumOfPages,
            PAGES_MESSAGE,
        )),
    }
}

fn validate_num_of_pages_value(value: &Value) -> Result<u32, BookValidationError> {
    let invalid = || BookValidationError::new(BookField::NumOfPages, PAGES_MESSAGE);
    let Value::Number(number) = value else {
        return Err(invalid());
    };
    if let Some(integer) = number.as_i64() {
        return validate_num_of_pages(integer);
    }
    // Fractional page counts are rejected; `parseInt` on the form never
    // produces them.
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float > 0.0 && float <= f64::from(u32::MAX) => {
            Ok(float as u32)
        }
        _ => Err(invalid()),
    }
}
