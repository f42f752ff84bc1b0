use crate::error::{Result, WordbookError};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILENAME: &str = "settings.json";

/// Environment variable overriding the settings directory.
pub const HOME_ENV: &str = "WORDBOOK_HOME";

pub const STORAGE_PATH: &str = "storage_path";
pub const LAST_SELECTED_WORD: &str = "last_selected_word";
pub const LAST_SEARCH_TEXT: &str = "last_search_text";

/// Keys `config` accepts.
pub const KNOWN_KEYS: &[&str] = &[STORAGE_PATH, LAST_SELECTED_WORD, LAST_SEARCH_TEXT];

/// Application preferences, stored as a flat JSON object in `settings.json`.
///
/// Read at startup, written at shutdown. Values are opaque strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    dir: PathBuf,
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Empty settings that will be saved into `dir`.
    pub fn empty<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            values: BTreeMap::new(),
        }
    }

    /// Load settings from the given directory, or start empty if there are none.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut settings = Self::empty(&dir);
        let path = settings.path();

        if !path.exists() {
            return Ok(settings);
        }

        let content = fs::read_to_string(&path).map_err(WordbookError::Io)?;
        settings.values = serde_json::from_str(&content).map_err(WordbookError::Serialization)?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(WordbookError::Io)?;
        }

        let content =
            serde_json::to_string_pretty(&self.values).map_err(WordbookError::Serialization)?;
        fs::write(self.path(), content).map_err(WordbookError::Io)?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILENAME)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn storage_path(&self) -> Option<PathBuf> {
        self.get(STORAGE_PATH)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}

/// Where settings and default data live.
#[derive(Debug, Clone)]
pub struct AppDirs {
    pub settings: PathBuf,
    pub data: PathBuf,
}

impl AppDirs {
    /// `$WORDBOOK_HOME` for both when set, the platform directories otherwise.
    pub fn discover() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|h| !h.is_empty()) {
            let home = PathBuf::from(home);
            return Ok(Self {
                settings: home.clone(),
                data: home,
            });
        }

        let dirs = ProjectDirs::from("com", "wordbook", "wordbook").ok_or_else(|| {
            WordbookError::Settings("could not determine a home directory".to_string())
        })?;
        Ok(Self {
            settings: dirs.config_dir().to_path_buf(),
            data: dirs.data_dir().to_path_buf(),
        })
    }

    /// Storage used on first launch, before `storage_path` is set.
    pub fn default_storage(&self) -> PathBuf {
        self.data.join("entries")
    }
}
