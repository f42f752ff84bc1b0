//! # Storage Layer
//!
//! Two levels live here:
//!
//! - [`StorageBackend`]: raw record I/O, one record per word. It knows nothing
//!   about ordering, uniqueness or schemas.
//! - [`EntryStore`](entry_store::EntryStore): the in-memory, word-sorted
//!   collection on top of a backend. It enforces the word invariants and
//!   writes every mutation through to the backend.
//!
//! ## Implementations
//!
//! - [`fs::FsBackend`]: production storage, one JSON file per word
//! - [`memory::MemBackend`]: in-memory storage for tests, with failure
//!   simulation
//!
//! ## Storage Format
//!
//! For `FsBackend`:
//! ```text
//! <storage_path>/
//! ├── cat.json
//! ├── ice%20cream.json    # keys are percent-encoded
//! └── feline.json
//! ```

use crate::error::{Result, WordbookError};
use crate::model::Entry;
use chrono::{DateTime, Utc};

pub mod entry_store;
pub mod fs;
pub mod memory;

pub use entry_store::EntryStore;

/// Result of reading every record of a backend.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Records that were read, in key order.
    pub records: Vec<(String, Entry)>,
    /// Keys whose record could not be read, with the reason.
    pub failures: Vec<(String, WordbookError)>,
}

/// Key-value record storage keyed by word.
pub trait StorageBackend {
    /// All keys currently stored, sorted.
    fn keys(&self) -> Result<Vec<String>>;

    /// Read a single record.
    fn get(&self, key: &str) -> Result<Entry>;

    /// Create or replace a record.
    fn set(&mut self, key: &str, entry: &Entry) -> Result<()>;

    /// Remove a record. Removing a key that does not exist is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Last modification time of a record, if the backend tracks it.
    fn modified_at(&self, key: &str) -> Result<Option<DateTime<Utc>>>;

    /// Read every record. A failing record is reported, not fatal.
    fn get_all(&self) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        for key in self.keys()? {
            match self.get(&key) {
                Ok(entry) => report.records.push((key, entry)),
                Err(e) => report.failures.push((key, e)),
            }
        }
        Ok(report)
    }
}
