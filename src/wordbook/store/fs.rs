use super::StorageBackend;
use crate::error::{Result, WordbookError};
use crate::model::Entry;
use chrono::{DateTime, Utc};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const RECORD_EXT: &str = ".json";

/// File-based backend: one pretty-printed JSON file per word.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a record for `key` is written to, whether or not it exists.
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(record_filename(key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(WordbookError::Io)?;
        }
        Ok(())
    }

    /// Every record file with the key it holds, sorted by key.
    ///
    /// Several files may hold the same key when names were written by hand,
    /// e.g. `ice cream.json` next to `ice%20cream.json`.
    fn record_files(&self) -> Result<Vec<(String, PathBuf)>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for dir_entry in fs::read_dir(&self.root).map_err(WordbookError::Io)? {
            let dir_entry = dir_entry.map_err(WordbookError::Io)?;
            let path = dir_entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(key) = dir_entry.file_name().to_str().and_then(key_from_filename) {
                files.push((key, path));
            }
        }
        files.sort();
        Ok(files)
    }

    /// Files holding `key` that are not at its canonical path.
    fn stray_files(&self, key: &str) -> Result<Vec<PathBuf>> {
        let canonical = self.record_path(key);
        Ok(self
            .record_files()?
            .into_iter()
            .filter(|(k, path)| k == key && *path != canonical)
            .map(|(_, path)| path)
            .collect())
    }

    /// The file to read for `key`: the canonical one when present, else any
    /// listed file holding that key.
    fn locate(&self, key: &str) -> Result<PathBuf> {
        let canonical = self.record_path(key);
        if canonical.is_file() {
            return Ok(canonical);
        }
        Ok(self.stray_files(key)?.into_iter().next().unwrap_or(canonical))
    }
}

fn record_filename(key: &str) -> String {
    format!("{}{}", urlencoding::encode(key), RECORD_EXT)
}

/// Key held by a file name. Names that do not decode are taken literally.
fn key_from_filename(name: &str) -> Option<String> {
    if name.starts_with('.') && name.ends_with(".tmp") {
        return None;
    }
    let stem = name.strip_suffix(RECORD_EXT)?;
    Some(match urlencoding::decode(stem) {
        Ok(key) => key.into_owned(),
        Err(_) => stem.to_string(),
    })
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(WordbookError::Io(e)),
    }
}

impl StorageBackend for FsBackend {
    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.record_files()?.into_iter().map(|(k, _)| k).collect();
        keys.dedup();
        Ok(keys)
    }

    fn get(&self, key: &str) -> Result<Entry> {
        let path = self.locate(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(WordbookError::EntryNotFound(key.to_string()))
            }
            Err(e) => return Err(WordbookError::Io(e)),
        };
        let entry: Entry = serde_json::from_str(&content).map_err(WordbookError::Serialization)?;
        Ok(entry)
    }

    /// Writes the record under its canonical name, then drops other files
    /// holding the same key so the next load sees a single record.
    fn set(&mut self, key: &str, entry: &Entry) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(entry).map_err(WordbookError::Serialization)?;

        // Write to a temp file first so a crash never leaves half a record
        let tmp_file = self.root.join(format!(".entry-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(WordbookError::Io)?;
        if let Err(e) = fs::rename(&tmp_file, self.record_path(key)) {
            let _ = fs::remove_file(&tmp_file);
            return Err(WordbookError::Io(e));
        }

        for stray in self.stray_files(key)? {
            debug!("event=set action=drop_stray file=\"{}\"", stray.display());
            remove_if_exists(&stray)?;
        }
        Ok(())
    }

    /// Removes every file holding `key`.
    fn remove(&mut self, key: &str) -> Result<()> {
        for stray in self.stray_files(key)? {
            remove_if_exists(&stray)?;
        }
        remove_if_exists(&self.record_path(key))
    }

    fn modified_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        match fs::metadata(self.locate(key)?) {
            Ok(meta) => {
                let modified = meta.modified().map_err(WordbookError::Io)?;
                Ok(Some(DateTime::<Utc>::from(modified)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WordbookError::Io(e)),
        }
    }
}
