//! # Entry Store
//!
//! Owns the in-memory entry collection and keeps it in step with a
//! [`StorageBackend`].
//!
//! ## Invariants
//!
//! - At most one entry per word.
//! - Every entry has every field of the schema it was loaded with.
//! - The collection is sorted by [`compare_words`] after every mutation.
//!
//! ## Write-through
//!
//! Mutations persist first and touch memory only once every backend call of
//! the operation succeeded. A rename is `remove(old)` then `set(new)`: if the
//! process dies, or `set` fails, between the two calls the old record is
//! already gone from disk. That window is accepted and never retried.

use super::StorageBackend;
use crate::error::{Result, ValidationError, WordbookError};
use crate::model::{compare_words, Entry, EntryId};
use crate::schema::Schema;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::collections::HashMap;

/// A record that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// `None` when the backend could not even list its records.
    pub key: Option<String>,
    pub reason: String,
}

pub struct EntryStore<B: StorageBackend> {
    backend: B,
    entries: Vec<Entry>,
    /// Backend key of each entry's record. Equal to the word except for
    /// records whose key and word disagree on disk.
    record_keys: HashMap<EntryId, String>,
    load_failures: Vec<LoadFailure>,
    revision: u64,
}

impl<B: StorageBackend> EntryStore<B> {
    /// Reads every record of `backend`, backfilling from the schema.
    ///
    /// Never fails: unreadable records are logged, remembered in
    /// [`EntryStore::load_failures`] and left out.
    pub fn load(backend: B, schema: &Schema) -> Self {
        let mut store = Self {
            backend,
            entries: Vec::new(),
            record_keys: HashMap::new(),
            load_failures: Vec::new(),
            revision: 0,
        };
        store.reload(schema);
        store
    }

    pub fn reload(&mut self, schema: &Schema) {
        self.entries.clear();
        self.record_keys.clear();
        self.load_failures.clear();
        self.revision += 1;

        let report = match self.backend.get_all() {
            Ok(report) => report,
            Err(e) => {
                error!("event=load status=failed reason=\"{}\"", e);
                self.load_failures.push(LoadFailure {
                    key: None,
                    reason: e.to_string(),
                });
                return;
            }
        };

        for (key, e) in report.failures {
            warn!("event=load_record status=failed key=\"{}\" reason=\"{}\"", key, e);
            self.load_failures.push(LoadFailure {
                key: Some(key),
                reason: e.to_string(),
            });
        }

        for (key, mut entry) in report.records {
            if entry.word.is_empty() {
                entry.word = key.clone();
            } else if entry.word != key {
                warn!(
                    "event=load_record status=mismatch key=\"{}\" word=\"{}\"",
                    key, entry.word
                );
            }

            if self.find_by_word(&entry.word).is_some() {
                warn!(
                    "event=load_record status=duplicate key=\"{}\" word=\"{}\"",
                    key, entry.word
                );
                self.load_failures.push(LoadFailure {
                    reason: format!("duplicate word \"{}\"", entry.word),
                    key: Some(key),
                });
                continue;
            }

            let added = schema.backfill(&mut entry);
            if added > 0 {
                debug!("event=backfill word=\"{}\" fields={}", entry.word, added);
            }
            self.record_keys.insert(entry.id(), key);
            self.entries.push(entry);
        }

        self.sort();
        info!(
            "event=load status=ok entries={} failures={}",
            self.entries.len(),
            self.load_failures.len()
        );
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bumped by every change to the collection.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn load_failures(&self) -> &[LoadFailure] {
        &self.load_failures
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn find_by_word(&self, word: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.word == word)
    }

    pub fn find_by_id(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// True when the record `entry` stands for is in the store.
    pub fn contains(&self, entry: &Entry) -> bool {
        self.position_of(entry).is_some()
    }

    /// True when some entry other than `except` (by identity) uses `word`.
    pub fn word_taken(&self, word: &str, except: Option<&Entry>) -> bool {
        self.entries
            .iter()
            .any(|e| e.word == word && !except.is_some_and(|x| x.is_same_record(e)))
    }

    pub fn modified_at(&self, word: &str) -> Option<DateTime<Utc>> {
        match self.backend.modified_at(word) {
            Ok(time) => time,
            Err(e) => {
                debug!("event=modified_at status=failed word=\"{}\" reason=\"{}\"", word, e);
                None
            }
        }
    }

    /// Backend key holding the record of the entry at `index`.
    fn record_key(&self, index: usize) -> String {
        let entry = &self.entries[index];
        self.record_keys
            .get(&entry.id())
            .cloned()
            .unwrap_or_else(|| entry.word.clone())
    }

    fn position_of(&self, entry: &Entry) -> Option<usize> {
        self.entries.iter().position(|e| e.is_same_record(entry))
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| compare_words(&a.word, &b.word));
    }

    /// Creates `new`, or replaces `old` with it.
    ///
    /// `old` only counts when its record is in the store; otherwise this is a
    /// creation. Returns the committed entry.
    pub fn upsert(&mut self, old: Option<&Entry>, new: Entry) -> Result<Entry> {
        if new.word.is_empty() {
            return Err(ValidationError::BlankWord.into());
        }

        let old_index = old.and_then(|o| self.position_of(o));
        let old_word = old_index.map(|i| self.entries[i].word.clone());
        let old_key = old_index.map(|i| self.record_key(i));
        let renamed = old_word.as_deref() != Some(new.word.as_str());

        if renamed {
            let except = old_index.map(|i| &self.entries[i]);
            if self.word_taken(&new.word, except) {
                return Err(ValidationError::DuplicateWord(new.word.clone()).into());
            }
        }

        // The old record goes first when it lives under another key
        let stale_key = old_key.filter(|k| *k != new.word);
        if let Some(key) = stale_key.as_deref() {
            if let Err(e) = self.backend.remove(key) {
                error!("event=remove status=failed key=\"{}\" reason=\"{}\"", key, e);
                return Err(e);
            }
        }

        if let Err(e) = self.backend.set(&new.word, &new) {
            error!("event=set status=failed word=\"{}\" reason=\"{}\"", new.word, e);
            if let Some(key) = &stale_key {
                warn!(
                    "event=rename status=partial old=\"{}\" new=\"{}\" record for old key already removed",
                    key, new.word
                );
            }
            return Err(e);
        }

        let key = new.word.clone();
        let mut new = new;
        let id = match old_index {
            Some(i) => {
                let id = self.entries[i].id();
                new.set_id(id);
                self.entries[i] = new;
                id
            }
            None => {
                if self.contains(&new) {
                    new.set_id(EntryId::new());
                }
                let id = new.id();
                self.entries.push(new);
                id
            }
        };
        self.record_keys.insert(id, key);
        self.sort();
        self.revision += 1;

        let committed = self
            .find_by_id(id)
            .cloned()
            .ok_or_else(|| WordbookError::Store("committed entry vanished".to_string()))?;
        match &old_word {
            Some(old_word) if *old_word != committed.word => debug!(
                "event=upsert action=rename old=\"{}\" new=\"{}\"",
                old_word, committed.word
            ),
            Some(_) => debug!("event=upsert action=update word=\"{}\"", committed.word),
            None => debug!("event=upsert action=create word=\"{}\"", committed.word),
        }
        Ok(committed)
    }

    /// Removes the record for `entry` from the backend, then from memory.
    ///
    /// The entry is located by identity, falling back to its word. On failure
    /// the collection is untouched.
    pub fn delete(&mut self, entry: &Entry) -> Result<Entry> {
        let index = self
            .position_of(entry)
            .or_else(|| {
                if entry.word.is_empty() {
                    None
                } else {
                    self.entries.iter().position(|e| e.word == entry.word)
                }
            })
            .ok_or_else(|| WordbookError::EntryNotFound(entry.word.clone()))?;

        let key = self.record_key(index);
        if let Err(e) = self.backend.remove(&key) {
            error!("event=remove status=failed key=\"{}\" reason=\"{}\"", key, e);
            return Err(e);
        }

        let removed = self.entries.remove(index);
        self.record_keys.remove(&removed.id());
        debug!("event=delete word=\"{}\" key=\"{}\"", removed.word, key);
        self.revision += 1;
        Ok(removed)
    }
}
