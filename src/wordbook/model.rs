//! Core data types: [`Entry`], [`FieldValue`] and the identity type [`EntryId`].
//!
//! An entry is keyed by its `word`. Every other attribute lives in an open
//! `fields` map whose shape is declared by the field modules of the
//! [`Schema`](crate::schema::Schema); the model itself only knows about `word`.
//!
//! On disk an entry is a flat JSON object:
//!
//! ```text
//! {
//!   "word": "petrichor",
//!   "definition": "the smell of rain on dry earth",
//!   "synonyms": [],
//!   "tags": ["weather", "smell"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Name of the key field. Every entry has it, whatever modules are registered.
pub const WORD: &str = "word";

/// Separator used when a list field is flattened for searching.
pub const LIST_SEPARATOR: &str = ",";

/// In-memory identity of an entry.
///
/// Not persisted: it is assigned when a record is loaded or created and tells
/// the store which record a working copy will replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    List,
    Other,
}

/// Value of a single entry field.
///
/// Records edited by hand may hold anything JSON allows; such values are
/// kept as [`FieldValue::Other`] and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Other(Value),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::List(_) => FieldKind::List,
            FieldValue::Other(_) => FieldKind::Other,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// The string a search query is matched against.
    ///
    /// Lists are joined with [`LIST_SEPARATOR`], so a query can match across
    /// element boundaries.
    pub fn search_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::List(items) => Cow::Owned(items.join(LIST_SEPARATOR)),
            FieldValue::Other(Value::Null) => Cow::Borrowed(""),
            FieldValue::Other(value) => Cow::Owned(value.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Other(Value::Null) => true,
            FieldValue::Other(Value::Array(items)) => items.is_empty(),
            FieldValue::Other(Value::Object(map)) => map.is_empty(),
            FieldValue::Other(_) => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::List(items) => write!(f, "{}", items.join(", ")),
            FieldValue::Other(Value::Null) => Ok(()),
            FieldValue::Other(value) => write!(f, "{}", value),
        }
    }
}

/// One dictionary record.
///
/// `Clone` is a full deep copy and keeps the identity; use
/// [`Entry::with_fresh_id`] for a copy that stands for a new record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    #[serde(skip, default = "EntryId::new")]
    id: EntryId,

    #[serde(default)]
    pub word: String,

    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Entry {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            word: word.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }

    /// A deep copy that refers to no existing record.
    pub fn with_fresh_id(&self) -> Self {
        let mut copy = self.clone();
        copy.id = EntryId::new();
        copy
    }

    /// True when both values stand for the same record, regardless of content.
    pub fn is_same_record(&self, other: &Entry) -> bool {
        self.id == other.id
    }

    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        name == WORD || self.fields.contains_key(name)
    }

    /// Sets a field. `word` is routed to the key, and only accepts text.
    pub fn set(&mut self, name: &str, value: FieldValue) {
        if name == WORD {
            if let FieldValue::Text(word) = value {
                self.word = word;
            }
            return;
        }
        self.fields.insert(name.to_string(), value);
    }

    /// Text of a field, or `""` when it is missing or not text.
    pub fn text(&self, name: &str) -> &str {
        if name == WORD {
            return &self.word;
        }
        self.get(name).and_then(FieldValue::as_text).unwrap_or("")
    }

    /// Items of a list field, or an empty slice when missing or not a list.
    pub fn list(&self, name: &str) -> &[String] {
        self.get(name).and_then(FieldValue::as_list).unwrap_or(&[])
    }

    pub fn search_text(&self, name: &str) -> Cow<'_, str> {
        if name == WORD {
            return Cow::Borrowed(&self.word);
        }
        self.get(name)
            .map(FieldValue::search_text)
            .unwrap_or(Cow::Borrowed(""))
    }
}

/// Value equality: the word and every field. Identity is ignored.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.word == other.word && self.fields == other.fields
    }
}

impl Eq for Entry {}

/// Ordering used for the entry collection.
///
/// Letters are compared without accents or case first, so "éclair" sorts
/// next to "eclair" rather than after "zebra". Ties fall back to lowercase,
/// then raw order, to keep the result total.
pub fn compare_words(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Lowercase with diacritics stripped: "Éclair" becomes "eclair".
fn fold(word: &str) -> String {
    word.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
