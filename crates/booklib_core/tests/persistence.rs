use booklib_core::store::{record_key, IDS_KEY, VERSION_KEY};
use booklib_core::{
    decode, starter_books, BookStore, ErrorKind, InitOutcome, KeyValueStore, KvError,
    KvResult, ManualClock, MemoryKvStore, SeedReason, StoreConfig,
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

const GATSBY_ID: &str = "b1e7e0c2-1f2a-4e3b-9c4d-8a1f2b3c4d5e";
const MOCKINGBIRD_ID: &str = "a2d8f3b4-2c3d-4e5f-8b7a-9c0d1e2f3a4b";
const ORWELL_1984_ID: &str = "c3f9e4d5-3b4c-5d6e-9a8b-0c1d2e3f4b5a";

/// Memory store that counts writes and can be switched into failure mode.
#[derive(Default)]
struct FlakyKv {
    inner: MemoryKvStore,
    sets: Cell<usize>,
    fail_writes: Rc<Cell<bool>>,
    fail_reads: Rc<Cell<bool>>,
}

impl FlakyKv {
    fn wrap(inner: MemoryKvStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }
}

impl KeyValueStore for FlakyKv {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(KvError::Unavailable("storage disabled".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        if self.fail_writes.get() {
            return Err(KvError::Unavailable("quota exceeded".to_string()));
        }
        self.sets.set(self.sets.get() + 1);
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> KvResult<()> {
        if self.fail_writes.get() {
            return Err(KvError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.remove(key)
    }
}

fn store_over<S: KeyValueStore>(backend: S, clock: &ManualClock) -> BookStore<S, ManualClock> {
    let mut store = BookStore::new(backend, clock.clone(), StoreConfig::default());
    store.initialize();
    store
}

fn stored_book<S: KeyValueStore>(store: &BookStore<S, ManualClock>, id: &str) -> Option<booklib_core::Book> {
    store
        .backend()
        .get(&record_key(id))
        .unwrap()
        .map(|raw| decode(&raw).unwrap())
}

#[test]
fn fresh_store_seeds_and_writes_through() {
    let clock = ManualClock::at_millis(0);
    let mut store = BookStore::new(MemoryKvStore::new(), clock.clone(), StoreConfig::default());

    let outcome = store.initialize();
    assert_eq!(
        outcome,
        InitOutcome::Seeded {
            reason: SeedReason::MissingVersion,
            records: 12
        }
    );

    let kv = store.backend();
    assert_eq!(kv.get(VERSION_KEY).unwrap().as_deref(), Some("1"));
    assert_eq!(kv.len(), 14);
    assert_eq!(stored_book(&store, GATSBY_ID).unwrap(), starter_books()[0]);
    assert!(store.scheduler().is_idle());
}

#[test]
fn rapid_updates_coalesce_into_one_write_back_pass() {
    let clock = ManualClock::at_millis(1_000_000);
    let mut store = store_over(FlakyKv::default(), &clock);
    let baseline = store.backend().sets.get();

    store.update_read_status(GATSBY_ID, false).unwrap();
    clock.advance(Duration::from_millis(30));
    store.update_read_status(MOCKINGBIRD_ID, true).unwrap();
    clock.advance(Duration::from_millis(30));
    store.update_read_status(ORWELL_1984_ID, true).unwrap();
    store.update_read_status(GATSBY_ID, true).unwrap();
    assert_eq!(store.pending_writes(), 3);

    // Deadline is 100ms after the last mutation.
    clock.advance(Duration::from_millis(99));
    assert!(store.poll().is_none());
    assert_eq!(store.backend().sets.get(), baseline);

    clock.advance(Duration::from_millis(50));
    let report = store.poll().expect("write-back pass should run");
    assert!(report.is_success());
    assert!(!report.ids_rewritten);
    assert_eq!(
        report.written,
        vec![GATSBY_ID, MOCKINGBIRD_ID, ORWELL_1984_ID]
    );
    assert_eq!(store.backend().sets.get(), baseline + 3);

    // Latest state, not the state at mark time.
    assert!(stored_book(&store, GATSBY_ID).unwrap().is_read);
    assert!(stored_book(&store, MOCKINGBIRD_ID).unwrap().is_read);

    clock.advance(Duration::from_secs(5));
    assert!(store.poll().is_none());
    assert_eq!(store.pending_writes(), 0);
}

#[test]
fn add_persists_record_and_id_list_after_quiet_period() {
    let clock = ManualClock::at_millis(0);
    let mut store = store_over(MemoryKvStore::new(), &clock);

    let book = store.add("Dune", "Frank Herbert", false, 412).unwrap();
    assert!(stored_book(&store, &book.id).is_none());

    clock.advance(Duration::from_millis(100));
    let report = store.poll().unwrap();
    assert_eq!(report.written, vec![book.id.clone()]);
    assert!(report.ids_rewritten);

    assert_eq!(stored_book(&store, &book.id).unwrap(), book);
    let ids = store.backend().get(IDS_KEY).unwrap().unwrap();
    assert!(ids.ends_with(&format!("\"{}\"]", book.id)));
}

#[test]
fn delete_persists_immediately_and_survives_reload() {
    let clock = ManualClock::at_millis(0);
    let mut store = store_over(MemoryKvStore::new(), &clock);

    store.delete(GATSBY_ID).unwrap();
    assert!(!store.backend().contains_key(&record_key(GATSBY_ID)));
    let ids = store.backend().get(IDS_KEY).unwrap().unwrap();
    assert!(!ids.contains(GATSBY_ID));
    assert!(store.scheduler().is_idle());

    let kv = store.shutdown();
    let reloaded = store_over(kv, &clock);
    assert_eq!(reloaded.len(), 11);
    assert_eq!(
        reloaded.find_by_id(GATSBY_ID).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn delete_of_unflushed_record_drops_pending_write() {
    let clock = ManualClock::at_millis(0);
    let mut store = store_over(MemoryKvStore::new(), &clock);

    let book = store.add("Dune", "Frank Herbert", false, 412).unwrap();
    store.delete(&book.id).unwrap();
    assert_eq!(store.pending_writes(), 0);

    clock.advance(Duration::from_millis(100));
    let report = store.poll().unwrap();
    assert!(report.written.is_empty());
    assert!(stored_book(&store, &book.id).is_none());
}

#[test]
fn shutdown_flushes_pending_writes() {
    let clock = ManualClock::at_millis(1_750_000_000_000);
    let mut store = store_over(MemoryKvStore::new(), &clock);
    let book = store.add("Dune", "Frank Herbert", false, 412).unwrap();
    let toggled = store.toggle_read_status(MOCKINGBIRD_ID).unwrap();

    let kv = store.shutdown();
    let mut reloaded = BookStore::new(kv, clock.clone(), StoreConfig::default());
    assert_eq!(
        reloaded.initialize(),
        InitOutcome::Loaded {
            records: 13,
            discarded: Vec::new()
        }
    );
    assert_eq!(reloaded.find_by_id(&book.id).unwrap(), book);
    assert_eq!(reloaded.find_by_id(MOCKINGBIRD_ID).unwrap(), toggled);
    assert_eq!(reloaded.list_all()[0].id, book.id);
}

#[test]
fn version_mismatch_discards_stored_records_and_reseeds() {
    let clock = ManualClock::at_millis(0);
    let mut store = store_over(MemoryKvStore::new(), &clock);
    let extra = store.add("Dune", "Frank Herbert", false, 412).unwrap();
    store.delete(GATSBY_ID).unwrap();
    let kv = store.shutdown();

    let mut upgraded = BookStore::new(kv, clock.clone(), StoreConfig::default().with_version(2));
    let outcome = upgraded.initialize();
    assert_eq!(
        outcome,
        InitOutcome::Seeded {
            reason: SeedReason::VersionMismatch {
                found: "1".to_string()
            },
            records: 12
        }
    );

    let mut expected = starter_books();
    expected.sort_by(|left, right| right.created_at.cmp(&left.created_at));
    assert_eq!(upgraded.list_all(), expected);

    let kv = upgraded.backend();
    assert_eq!(kv.get(VERSION_KEY).unwrap().as_deref(), Some("2"));
    assert!(!kv.contains_key(&record_key(&extra.id)));
    assert!(kv.contains_key(&record_key(GATSBY_ID)));
}

#[test]
fn missing_or_corrupt_records_are_discarded_and_id_list_compacted() {
    let clock = ManualClock::at_millis(0);
    let store = store_over(MemoryKvStore::new(), &clock);
    let mut kv = store.shutdown();
    kv.set(&record_key(GATSBY_ID), "{not json").unwrap();
    kv.remove(&record_key(MOCKINGBIRD_ID)).unwrap();

    let mut reloaded = BookStore::new(kv, clock.clone(), StoreConfig::default());
    assert_eq!(
        reloaded.initialize(),
        InitOutcome::Loaded {
            records: 10,
            discarded: vec![GATSBY_ID.to_string(), MOCKINGBIRD_ID.to_string()]
        }
    );

    clock.advance(Duration::from_millis(100));
    let report = reloaded.poll().unwrap();
    assert!(report.ids_rewritten);
    let ids = reloaded.backend().get(IDS_KEY).unwrap().unwrap();
    assert!(!ids.contains(GATSBY_ID));
    assert!(!ids.contains(MOCKINGBIRD_ID));
}

#[test]
fn corrupt_id_list_triggers_reseed() {
    let clock = ManualClock::at_millis(0);
    let store = store_over(MemoryKvStore::new(), &clock);
    let mut kv = store.shutdown();
    kv.set(IDS_KEY, "not-a-list").unwrap();

    let mut reloaded = BookStore::new(kv, clock.clone(), StoreConfig::default());
    let outcome = reloaded.initialize();
    assert!(matches!(
        outcome,
        InitOutcome::Seeded {
            reason: SeedReason::CorruptIds(_),
            records: 12
        }
    ));
}

#[test]
fn failed_write_back_keeps_dirty_set_for_retry() {
    let clock = ManualClock::at_millis(0);
    let mut store = store_over(FlakyKv::default(), &clock);
    let fail_writes = Rc::clone(&store.backend().fail_writes);

    fail_writes.set(true);
    store.update_read_status(GATSBY_ID, false).unwrap();
    clock.advance(Duration::from_millis(100));

    let report = store.poll().unwrap();
    assert_eq!(report.failure.map(|err| err.kind()), Some(ErrorKind::Storage));
    assert_eq!(store.pending_writes(), 1);
    // Disarmed until the next mutation or explicit flush.
    assert!(store.poll().is_none());

    fail_writes.set(false);
    store.update_read_status(MOCKINGBIRD_ID, true).unwrap();
    clock.advance(Duration::from_millis(100));
    let report = store.poll().unwrap();
    assert!(report.is_success());
    assert_eq!(report.written, vec![GATSBY_ID, MOCKINGBIRD_ID]);
    assert!(!stored_book(&store, GATSBY_ID).unwrap().is_read);
}

#[test]
fn failed_delete_leaves_record_in_place() {
    let clock = ManualClock::at_millis(0);
    let mut store = store_over(FlakyKv::default(), &clock);
    store.backend().fail_writes.set(true);

    let err = store.delete(GATSBY_ID).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(store.find_by_id(GATSBY_ID).is_ok());
    assert_eq!(store.len(), 12);
}

#[test]
fn unreadable_backend_falls_back_to_starter_data() {
    let clock = ManualClock::at_millis(0);
    let backend = FlakyKv::wrap(MemoryKvStore::new());
    backend.fail_reads.set(true);
    backend.fail_writes.set(true);

    let mut store = BookStore::new(backend, clock.clone(), StoreConfig::default());
    let outcome = store.initialize();
    assert!(matches!(
        outcome,
        InitOutcome::Seeded {
            reason: SeedReason::Backend(_),
            records: 12
        }
    ));
    assert_eq!(store.list_all().len(), 12);
}
