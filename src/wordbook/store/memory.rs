use super::StorageBackend;
use crate::error::{Result, WordbookError};
use crate::model::Entry;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// A persistence call, as recorded by [`MemBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOp {
    Set(String),
    Remove(String),
}

#[derive(Clone)]
struct StoredRecord {
    value: Value,
    modified_at: DateTime<Utc>,
}

/// In-memory storage backend for testing.
///
/// Records are kept as raw JSON so tests can seed records that do not match
/// the current schema. Failures can be simulated per key (reads) or
/// globally (writes, removes).
#[derive(Default)]
pub struct MemBackend {
    records: BTreeMap<String, StoredRecord>,
    failing_reads: HashSet<String>,
    fail_writes: bool,
    fail_removes: bool,
    fail_listing: bool,
    ops: Vec<BackendOp>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw record without going through [`Entry`].
    pub fn insert_raw(&mut self, key: &str, value: Value) {
        self.records.insert(
            key.to_string(),
            StoredRecord {
                value,
                modified_at: Utc::now(),
            },
        );
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.records.get(key).map(|r| &r.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn set_fail_read(&mut self, key: &str) {
        self.failing_reads.insert(key.to_string());
    }

    pub fn set_simulate_write_error(&mut self, simulate: bool) {
        self.fail_writes = simulate;
    }

    pub fn set_simulate_remove_error(&mut self, simulate: bool) {
        self.fail_removes = simulate;
    }

    pub fn set_simulate_listing_error(&mut self, simulate: bool) {
        self.fail_listing = simulate;
    }

    /// Successful persistence calls, oldest first.
    pub fn ops(&self) -> &[BackendOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl StorageBackend for MemBackend {
    fn keys(&self) -> Result<Vec<String>> {
        if self.fail_listing {
            return Err(WordbookError::Store("Simulated listing error".to_string()));
        }
        Ok(self.records.keys().cloned().collect())
    }

    fn get(&self, key: &str) -> Result<Entry> {
        if self.failing_reads.contains(key) {
            return Err(WordbookError::Store(format!(
                "Simulated read error for {}",
                key
            )));
        }
        let record = self
            .records
            .get(key)
            .ok_or_else(|| WordbookError::EntryNotFound(key.to_string()))?;
        let entry: Entry =
            serde_json::from_value(record.value.clone()).map_err(WordbookError::Serialization)?;
        Ok(entry)
    }

    fn set(&mut self, key: &str, entry: &Entry) -> Result<()> {
        if self.fail_writes {
            return Err(WordbookError::Store("Simulated write error".to_string()));
        }
        let value = serde_json::to_value(entry).map_err(WordbookError::Serialization)?;
        self.insert_raw(key, value);
        self.ops.push(BackendOp::Set(key.to_string()));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.fail_removes {
            return Err(WordbookError::Store("Simulated remove error".to_string()));
        }
        self.records.remove(key);
        self.ops.push(BackendOp::Remove(key.to_string()));
        Ok(())
    }

    fn modified_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.records.get(key).map(|r| r.modified_at))
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::FieldValue;
    use crate::schema::{DEFINITION, SYNONYMS, TAGS};

    pub struct BackendFixture {
        pub backend: MemBackend,
    }

    impl Default for BackendFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl BackendFixture {
        pub fn new() -> Self {
            Self {
                backend: MemBackend::new(),
            }
        }

        pub fn with_entry(mut self, word: &str, definition: &str, tags: &[&str]) -> Self {
            let entry = Entry::new(word)
                .with_field(DEFINITION, FieldValue::text(definition))
                .with_field(TAGS, FieldValue::list(tags.iter().copied()))
                .with_field(SYNONYMS, FieldValue::List(Vec::new()));
            self.backend.set(word, &entry).unwrap();
            self
        }

        pub fn with_words(mut self, words: &[&str]) -> Self {
            for word in words {
                self = self.with_entry(word, &format!("definition of {}", word), &[]);
            }
            self
        }

        pub fn with_raw(mut self, key: &str, value: Value) -> Self {
            self.backend.insert_raw(key, value);
            self
        }

        pub fn build(mut self) -> MemBackend {
            self.backend.clear_ops();
            self.backend
        }
    }
}
