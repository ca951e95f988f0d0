//! Fixed starter data set.
//!
//! Used when durable storage holds no compatible state.

use crate::model::book::Book;
use chrono::{DateTime, NaiveDate, Utc};

struct SeedRow {
    id: &'static str,
    // (year, month, day, hour, minute)
    created: (i32, u32, u32, u32, u32),
    title: &'static str,
    author: &'static str,
    is_read: bool,
    num_of_pages: u32,
}

const STARTER_ROWS: &[SeedRow] = &[
    SeedRow {
        id: "b1e7e0c2-1f2a-4e3b-9c4d-8a1f2b3c4d5e",
        created: (2024, 1, 15, 10, 0),
        title: "The Great Gatsby",
        author: "F. Scott Fitzgerald",
        is_read: true,
        num_of_pages: 180,
    },
    SeedRow {
        id: "a2d8f3b4-2c3d-4e5f-8b7a-9c0d1e2f3a4b",
        created: (2024, 2, 20, 11, 0),
        title: "To Kill a Mockingbird",
        author: "Harper Lee",
        is_read: false,
        num_of_pages: 281,
    },
    SeedRow {
        id: "c3f9e4d5-3b4c-5d6e-9a8b-0c1d2e3f4b5a",
        created: (2024, 3, 10, 12, 0),
        title: "1984",
        author: "George Orwell",
        is_read: false,
        num_of_pages: 328,
    },
    SeedRow {
        id: "d4a8b5e6-4c5d-6e7f-0a9b-1c2d3e4f5a6b",
        created: (2024, 4, 15, 14, 30),
        title: "Pride and Prejudice",
        author: "Jane Austen",
        is_read: true,
        num_of_pages: 432,
    },
    SeedRow {
        id: "e5b9c6f7-5d6e-7f8a-1b0c-2d3e4f5a6b7c",
        created: (2024, 5, 20, 9, 15),
        title: "The Catcher in the Rye",
        author: "J.D. Salinger",
        is_read: false,
        num_of_pages: 277,
    },
    SeedRow {
        id: "f6c0d7a8-6e7f-8a9b-2c1d-3e4f5a6b7c8d",
        created: (2024, 6, 10, 16, 45),
        title: "Lord of the Flies",
        author: "William Golding",
        is_read: true,
        num_of_pages: 224,
    },
    SeedRow {
        id: "a7d1e8b9-7f8a-9b0c-3d2e-4f5a6b7c8d9e",
        created: (2024, 7, 5, 11, 20),
        title: "The Hobbit",
        author: "J.R.R. Tolkien",
        is_read: true,
        num_of_pages: 310,
    },
    SeedRow {
        id: "b8e2f9c0-8a9b-0c1d-4e3f-5a6b7c8d9e0f",
        created: (2024, 8, 12, 13, 0),
        title: "Brave New World",
        author: "Aldous Huxley",
        is_read: false,
        num_of_pages: 268,
    },
    SeedRow {
        id: "c9f3a0d1-9b0c-1d2e-5f4a-6b7c8d9e0f1a",
        created: (2024, 9, 3, 8, 30),
        title: "The Picture of Dorian Gray",
        author: "Oscar Wilde",
        is_read: false,
        num_of_pages: 254,
    },
    SeedRow {
        id: "d0a4b1e2-0c1d-2e3f-6a5b-7c8d9e0f1a2b",
        created: (2024, 10, 18, 15, 10),
        title: "Fahrenheit 451",
        author: "Ray Bradbury",
        is_read: true,
        num_of_pages: 194,
    },
    SeedRow {
        id: "e1b5c2f3-1d2e-3f4a-7b6c-8d9e0f1a2b3c",
        created: (2024, 11, 25, 10, 45),
        title: "The Alchemist",
        author: "Paulo Coelho",
        is_read: true,
        num_of_pages: 163,
    },
    SeedRow {
        id: "f2c6d3a4-2e3f-4a5b-8c7d-9e0f1a2b3c4d",
        created: (2024, 12, 8, 12, 20),
        title: "Animal Farm",
        author: "George Orwell",
        is_read: false,
        num_of_pages: 112,
    },
];

/// Returns the starter records in insertion order.
pub fn starter_books() -> Vec<Book> {
    STARTER_ROWS
        .iter()
        .filter_map(|row| {
            let created_at = utc_timestamp(row.created)?;
            Some(Book {
                id: row.id.to_string(),
                created_at,
                updated_at: created_at,
                title: row.title.to_string(),
                author: row.author.to_string(),
                is_read: row.is_read,
                num_of_pages: row.num_of_pages,
            })
        })
        .collect()
}

fn utc_timestamp((year, month, day, hour, minute): (i32, u32, u32, u32, u32)) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, 0)
        .map(|naive| naive.and_utc())
}
