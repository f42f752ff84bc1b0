//! # Entry Schema
//!
//! Entries have no fixed shape beyond `word`. Each attribute is declared by a
//! [`FieldModule`]: a module id, a display title and the default values it
//! contributes. The registered modules are folded once, at startup, into a
//! [`Schema`], which owns the resulting NullEntry.
//!
//! The NullEntry is used to:
//! - seed new entries ([`Schema::blank_entry`])
//! - backfill fields missing from persisted records ([`Schema::backfill`])
//! - stand for "no entry selected"
//!
//! When two modules declare the same field, the first registered one wins.

use crate::model::{Entry, FieldKind, FieldValue, WORD};
use std::collections::HashSet;

pub const DEFINITION: &str = "definition";
pub const TAGS: &str = "tags";
pub const SYNONYMS: &str = "synonyms";

/// A pluggable declaration of entry attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldModule {
    pub name: String,
    pub title: String,
    pub default_values: Vec<(String, FieldValue)>,
}

impl FieldModule {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            default_values: Vec::new(),
        }
    }

    pub fn with_default(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.default_values.push((field.into(), value));
        self
    }
}

/// The modules every wordbook starts with, in display order.
pub fn builtin_modules() -> Vec<FieldModule> {
    vec![
        FieldModule::new("module-word", "word").with_default(WORD, FieldValue::text("")),
        FieldModule::new("module-definition", "definition")
            .with_default(DEFINITION, FieldValue::text("")),
        FieldModule::new("module-tags", "tags").with_default(TAGS, FieldValue::List(Vec::new())),
        FieldModule::new("module-synonyms", "synonyms")
            .with_default(SYNONYMS, FieldValue::List(Vec::new())),
    ]
}

/// Folds the default values of `modules` into a single template entry.
///
/// Later modules never override a field an earlier module already declared.
pub fn build_null_entry(modules: &[FieldModule]) -> Entry {
    let mut null_entry = Entry::new("");
    let mut seen = HashSet::new();

    for module in modules {
        for (field, value) in &module.default_values {
            if seen.insert(field.as_str()) {
                null_entry.set(field, value.clone());
            }
        }
    }

    null_entry
}

/// A field as declared by the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub default: FieldValue,
    /// Module that declared the field.
    pub module: String,
}

#[derive(Debug, Clone)]
pub struct Schema {
    modules: Vec<FieldModule>,
    fields: Vec<FieldSpec>,
    null_entry: Entry,
}

impl Schema {
    pub fn new(modules: Vec<FieldModule>) -> Self {
        let null_entry = build_null_entry(&modules);

        let mut fields: Vec<FieldSpec> = Vec::new();
        for module in &modules {
            for (field, value) in &module.default_values {
                if fields.iter().any(|f| &f.name == field) {
                    continue;
                }
                fields.push(FieldSpec {
                    name: field.clone(),
                    kind: value.kind(),
                    default: value.clone(),
                    module: module.name.clone(),
                });
            }
        }

        Self {
            modules,
            fields,
            null_entry,
        }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_modules())
    }

    pub fn modules(&self) -> &[FieldModule] {
        &self.modules
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The template itself. Its identity is shared; use [`Schema::blank_entry`]
    /// for anything that may end up in the store.
    pub fn null_entry(&self) -> &Entry {
        &self.null_entry
    }

    /// A deep copy of the NullEntry with an identity of its own.
    pub fn blank_entry(&self) -> Entry {
        self.null_entry.with_fresh_id()
    }

    /// Adds every declared field missing from `entry` with its default value.
    ///
    /// Existing values are left alone, even when their kind differs from the
    /// declaration. Returns the number of fields added.
    pub fn backfill(&self, entry: &mut Entry) -> usize {
        let mut added = 0;
        for (name, value) in &self.null_entry.fields {
            if !entry.fields.contains_key(name) {
                entry.fields.insert(name.clone(), value.clone());
                added += 1;
            }
        }
        added
    }

    pub fn module_title(&self, module_name: &str) -> Option<&str> {
        self.modules
            .iter()
            .find(|m| m.name == module_name)
            .map(|m| m.title.as_str())
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::builtin()
    }
}
