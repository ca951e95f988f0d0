use booklib_core::{
    BookField, BookStore, ErrorKind, ManualClock, MemoryKvStore, StoreConfig, StoreError,
};
use serde_json::json;
use std::time::Duration;

const GATSBY_ID: &str = "b1e7e0c2-1f2a-4e3b-9c4d-8a1f2b3c4d5e";

fn empty_store(clock: &ManualClock) -> BookStore<MemoryKvStore, ManualClock> {
    let mut store = BookStore::new(
        MemoryKvStore::new(),
        clock.clone(),
        StoreConfig::default().with_seed(Vec::new()),
    );
    store.initialize();
    store
}

fn seeded_store(clock: &ManualClock) -> BookStore<MemoryKvStore, ManualClock> {
    let mut store = BookStore::new(MemoryKvStore::new(), clock.clone(), StoreConfig::default());
    store.initialize();
    store
}

fn invalid_field(err: StoreError) -> BookField {
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    err.field().unwrap()
}

#[test]
fn add_then_find_by_id_returns_equal_record() {
    let clock = ManualClock::at_millis(1_700_000_000_000);
    let mut store = empty_store(&clock);

    let added = store.add("Dune", "Frank Herbert", false, 412).unwrap();
    assert_eq!(added.created_at, added.updated_at);
    assert_eq!(added.created_at.timestamp_millis(), 1_700_000_000_000);

    let found = store.find_by_id(&added.id).unwrap();
    assert_eq!(found, added);
}

#[test]
fn duplicate_title_and_author_conflicts_regardless_of_other_fields() {
    let clock = ManualClock::at_millis(0);
    let mut store = empty_store(&clock);

    store.add("T", "A", true, 100).unwrap();
    let err = store.add("T", "A", false, 7).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(store.len(), 1);

    // Case-sensitive uniqueness.
    store.add("t", "A", true, 100).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn validation_reports_first_failing_field() {
    let clock = ManualClock::at_millis(0);
    let mut store = empty_store(&clock);

    assert_eq!(invalid_field(store.add("", "A", true, 10).unwrap_err()), BookField::Title);
    assert_eq!(invalid_field(store.add("T", "", true, 10).unwrap_err()), BookField::Author);
    assert_eq!(
        invalid_field(store.add("T", "A", true, 0).unwrap_err()),
        BookField::NumOfPages
    );
    assert_eq!(
        invalid_field(store.add("T", "A", true, -5).unwrap_err()),
        BookField::NumOfPages
    );

    let err = store
        .add_form(&json!({"title": "T", "author": "A", "isRead": "yes", "numOfPages": 10}))
        .unwrap_err();
    assert_eq!(invalid_field(err), BookField::IsRead);
    assert!(store.is_empty());
}

#[test]
fn field_validation_runs_before_uniqueness() {
    let clock = ManualClock::at_millis(0);
    let mut store = empty_store(&clock);
    store.add("T", "A", true, 10).unwrap();

    let err = store.add("T", "A", true, 0).unwrap_err();
    assert_eq!(invalid_field(err), BookField::NumOfPages);
}

#[test]
fn add_form_accepts_valid_payload() {
    let clock = ManualClock::at_millis(0);
    let mut store = empty_store(&clock);
    let book = store
        .add_form(&json!({"title": "Emma", "author": "Jane Austen", "isRead": true, "numOfPages": 474}))
        .unwrap();
    assert!(book.is_read);
    assert_eq!(book.num_of_pages, 474);
}

#[test]
fn list_all_orders_newest_first_with_stable_ties() {
    let clock = ManualClock::at_millis(10_000);
    let mut store = empty_store(&clock);

    let first = store.add("One", "A", false, 1).unwrap();
    let tied = store.add("Two", "A", false, 2).unwrap();
    clock.advance(Duration::from_secs(1));
    let newest = store.add("Three", "A", false, 3).unwrap();

    let ids: Vec<_> = store.list_all().into_iter().map(|book| book.id).collect();
    assert_eq!(ids, vec![newest.id, first.id, tied.id]);
}

#[test]
fn seeded_list_is_sorted_descending() {
    let clock = ManualClock::at_millis(0);
    let store = seeded_store(&clock);
    let books = store.list_all();
    assert_eq!(books.len(), 12);
    assert_eq!(books[0].title, "Animal Farm");
    assert_eq!(books[11].title, "The Great Gatsby");
    assert!(books
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}

#[test]
fn find_by_id_rejects_blank_and_unknown_ids() {
    let clock = ManualClock::at_millis(0);
    let store = seeded_store(&clock);

    assert_eq!(invalid_field(store.find_by_id("  ").unwrap_err()), BookField::Id);
    assert_eq!(
        store.find_by_id("missing").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn find_by_title_is_exact_and_case_sensitive() {
    let clock = ManualClock::at_millis(0);
    let store = seeded_store(&clock);

    assert_eq!(store.find_by_title("1984").unwrap().author, "George Orwell");
    assert_eq!(
        store.find_by_title("the hobbit").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(invalid_field(store.find_by_title("").unwrap_err()), BookField::Title);
}

#[test]
fn find_by_author_returns_all_matches_or_empty() {
    let clock = ManualClock::at_millis(0);
    let store = seeded_store(&clock);

    let titles: Vec<_> = store
        .find_by_author("George Orwell")
        .unwrap()
        .into_iter()
        .map(|book| book.title)
        .collect();
    assert_eq!(titles, vec!["1984", "Animal Farm"]);

    assert!(store.find_by_author("Nobody").unwrap().is_empty());
    assert_eq!(invalid_field(store.find_by_author(" ").unwrap_err()), BookField::Author);
}

#[test]
fn update_read_status_changes_only_status_and_updated_at() {
    let clock = ManualClock::at_millis(1_000);
    let mut store = empty_store(&clock);
    let before = store.add("T", "A", false, 50).unwrap();

    clock.advance(Duration::from_millis(1_500));
    let after = store.update_read_status(&before.id, true).unwrap();

    assert!(after.is_read);
    assert_eq!(after.updated_at.timestamp_millis(), 2_500);
    assert_eq!(after.id, before.id);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.title, before.title);
    assert_eq!(after.author, before.author);
    assert_eq!(after.num_of_pages, before.num_of_pages);
    assert_eq!(store.find_by_id(&before.id).unwrap(), after);
}

#[test]
fn update_read_status_validates_id_then_status_then_existence() {
    let clock = ManualClock::at_millis(0);
    let mut store = seeded_store(&clock);

    let err = store.update_read_status_form("", &json!("yes")).unwrap_err();
    assert_eq!(invalid_field(err), BookField::Id);

    let err = store
        .update_read_status_form(GATSBY_ID, &json!("yes"))
        .unwrap_err();
    assert_eq!(invalid_field(err), BookField::IsRead);

    let err = store.update_read_status("missing", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let book = store.update_read_status_form(GATSBY_ID, &json!(false)).unwrap();
    assert!(!book.is_read);
}

#[test]
fn toggle_flips_status() {
    let clock = ManualClock::at_millis(0);
    let mut store = seeded_store(&clock);

    assert!(!store.toggle_read_status(GATSBY_ID).unwrap().is_read);
    assert!(store.toggle_read_status(GATSBY_ID).unwrap().is_read);
}

#[test]
fn delete_returns_snapshot_and_removes_record() {
    let clock = ManualClock::at_millis(0);
    let mut store = seeded_store(&clock);

    let removed = store.delete(GATSBY_ID).unwrap();
    assert_eq!(removed.title, "The Great Gatsby");
    assert_eq!(store.len(), 11);
    assert_eq!(
        store.find_by_id(GATSBY_ID).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        store.delete(GATSBY_ID).unwrap_err().kind(),
        ErrorKind::NotFound
    );

    // The pair is free again.
    store
        .add("The Great Gatsby", "F. Scott Fitzgerald", true, 180)
        .unwrap();
}

#[test]
fn search_filters_sorted_list() {
    let clock = ManualClock::at_millis(0);
    let store = seeded_store(&clock);

    let titles: Vec<_> = store
        .search("the")
        .into_iter()
        .map(|book| book.title)
        .collect();
    assert_eq!(
        titles,
        vec![
            "The Alchemist",
            "The Picture of Dorian Gray",
            "The Hobbit",
            "Lord of the Flies",
            "The Catcher in the Rye",
            "The Great Gatsby",
        ]
    );
    assert_eq!(store.search("").len(), 12);
}
