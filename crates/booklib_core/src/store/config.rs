//! Store configuration.

use crate::model::book::Book;
use crate::model::seed::starter_books;
use std::time::Duration;

/// Version stamp written to `books_version`.
pub const DEFAULT_STORE_VERSION: u32 = 1;
/// Quiet period before dirty records are written back.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Tunables for one `BookStore` instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    version: u32,
    debounce: Duration,
    seed: Vec<Book>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_STORE_VERSION,
            debounce: DEFAULT_DEBOUNCE,
            seed: starter_books(),
        }
    }
}

impl StoreConfig {
    /// Bumping the version forces a reseed of stores written by older builds.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Replaces the starter data set. Records violating the uniqueness
    /// invariants are dropped at seed time.
    pub fn with_seed(mut self, seed: Vec<Book>) -> Self {
        self.seed = seed;
        self
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn seed(&self) -> &[Book] {
        &self.seed
    }
}
