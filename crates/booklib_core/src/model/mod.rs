//! Domain model for library records.
//!
//! # Responsibility
//! - Define the canonical `Book` record and its creation input.
//! - Own the field-level validation rules shared by store and codec.
//!
//! # Invariants
//! - Every record is identified by a stable `BookId`.
//! - `num_of_pages > 0` and `updated_at >= created_at` for every record.

pub mod book;
pub mod seed;
