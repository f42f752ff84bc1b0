//! # Search Filter
//!
//! Pure filtering of the entry list for display. Input order is preserved.
//!
//! A query is either plain text, matched against word, definition and tags,
//! or a scope query `field:text` restricted to one field:
//!
//! | scope                 | field        |
//! |-----------------------|--------------|
//! | `word`                | word         |
//! | `def`, `definition`   | definition   |
//! | `tag`                 | tags         |
//!
//! An unknown scope falls back to the plain search, using only the text after
//! the colon. Matching is literal substring containment: no case folding.
//! Tags are matched against their joined representation (`a,b,c`), not
//! element by element.

use crate::model::{Entry, WORD};
use crate::schema::{DEFINITION, TAGS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    Word,
    Definition,
    Tag,
}

impl QueryScope {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "word" => Some(QueryScope::Word),
            "def" | "definition" => Some(QueryScope::Definition),
            "tag" => Some(QueryScope::Tag),
            _ => None,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            QueryScope::Word => WORD,
            QueryScope::Definition => DEFINITION,
            QueryScope::Tag => TAGS,
        }
    }
}

/// A parsed search string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query<'a> {
    pub scope: Option<QueryScope>,
    pub text: &'a str,
}

impl<'a> Query<'a> {
    pub fn parse(query: &'a str) -> Self {
        match query.split_once(':') {
            Some((scope, text)) => Self {
                scope: QueryScope::from_name(scope),
                text,
            },
            None => Self {
                scope: None,
                text: query,
            },
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        match self.scope {
            Some(scope) => entry.search_text(scope.field()).contains(self.text),
            None => [WORD, DEFINITION, TAGS]
                .iter()
                .any(|field| entry.search_text(field).contains(self.text)),
        }
    }
}

/// Entries matching `query`, in input order.
pub fn filter<'e>(entries: &'e [Entry], query: &str) -> Vec<&'e Entry> {
    if query.is_empty() {
        return entries.iter().collect();
    }
    let query = Query::parse(query);
    entries.iter().filter(|e| query.matches(e)).collect()
}

/// The query that lists every entry tagged with `tag`.
pub fn tag_query(tag: &str) -> String {
    format!("tag:{}", tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValue;

    fn entry(word: &str, definition: &str, tags: &[&str]) -> Entry {
        Entry::new(word)
            .with_field(DEFINITION, FieldValue::text(definition))
            .with_field(TAGS, FieldValue::list(tags.iter().copied()))
    }

    fn sample() -> Vec<Entry> {
        vec![
            entry("cat", "a small feline", &["animal", "pet"]),
            entry("catalog", "a list of items", &["document"]),
            entry("dog", "a loyal animal", &["animal"]),
            entry("Zebra", "striped", &[]),
        ]
    }

    fn words(found: Vec<&Entry>) -> Vec<&str> {
        found.into_iter().map(|e| e.word.as_str()).collect()
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let entries = sample();
        assert_eq!(
            words(filter(&entries, "")),
            vec!["cat", "catalog", "dog", "Zebra"]
        );
    }

    #[test]
    fn plain_query_searches_word_definition_and_tags() {
        let entries = sample();
        assert_eq!(words(filter(&entries, "cat")), vec!["cat", "catalog"]);
        assert_eq!(words(filter(&entries, "list")), vec!["catalog"]);
        assert_eq!(words(filter(&entries, "animal")), vec!["cat", "dog"]);
    }

    #[test]
    fn word_scope_only_checks_word() {
        let entries = sample();
        assert_eq!(words(filter(&entries, "word:animal")), Vec::<&str>::new());
        assert_eq!(words(filter(&entries, "word:dog")), vec!["dog"]);
    }

    #[test]
    fn definition_scope_accepts_both_names() {
        let entries = sample();
        assert_eq!(words(filter(&entries, "def:animal")), vec!["dog"]);
        assert_eq!(words(filter(&entries, "definition:animal")), vec!["dog"]);
    }

    #[test]
    fn tag_scope_matches_joined_representation() {
        let entries = sample();
        assert_eq!(words(filter(&entries, "tag:animal")), vec!["cat", "dog"]);
        assert_eq!(words(filter(&entries, "tag:ani")), vec!["cat", "dog"]);
        assert_eq!(words(filter(&entries, "tag:animal,pet")), vec!["cat"]);
    }

    #[test]
    fn unknown_scope_falls_back_to_text_after_colon() {
        let entries = sample();
        assert_eq!(words(filter(&entries, "color:striped")), vec!["Zebra"]);
    }

    #[test]
    fn only_first_colon_splits() {
        let q = Query::parse("def:a:b");
        assert_eq!(q.scope, Some(QueryScope::Definition));
        assert_eq!(q.text, "a:b");
    }

    #[test]
    fn matching_is_case_sensitive() {
        let entries = sample();
        assert_eq!(words(filter(&entries, "zebra")), Vec::<&str>::new());
        assert_eq!(words(filter(&entries, "Zebra")), vec!["Zebra"]);
    }

    #[test]
    fn scope_with_empty_text_matches_all() {
        let entries = sample();
        assert_eq!(filter(&entries, "tag:").len(), 4);
    }

    #[test]
    fn tag_query_builds_scope_query() {
        assert_eq!(tag_query("pet"), "tag:pet");
    }
}
