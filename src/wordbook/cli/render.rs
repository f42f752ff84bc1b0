//! # Rendering
//!
//! Turns entries and messages into terminal text. Every `render_*` function
//! returns a `String`; printing happens in `commands.rs`.
//!
//! Layout (width, truncation, padding) is computed on plain text with
//! `unicode-width`, and styles from [`super::styles`] are applied last so
//! ANSI codes never count towards column widths.

use super::styles::{names, styled};
use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use wordbook::model::{Entry, WORD};
use wordbook::schema::{Schema, DEFINITION, SYNONYMS, TAGS};

pub const LINE_WIDTH: usize = 100;
pub const TIME_WIDTH: usize = 14;
const MAX_WORD_WIDTH: usize = 24;
const INDENT: &str = "  ";
const GAP: &str = "  ";
const TAG_MARKER: &str = "#";
const EMPTY_VALUE: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: MessageLevel,
    pub content: String,
}

impl Message {
    pub fn info(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, content)
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Success, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, content)
    }

    fn new(level: MessageLevel, content: impl Into<String>) -> Self {
        Self {
            level,
            content: content.into(),
        }
    }
}

/// An entry as shown in a list: the entry and when its record last changed.
pub struct ListedEntry<'a> {
    pub entry: &'a Entry,
    pub modified: Option<DateTime<Utc>>,
}

pub fn render_entry_list(entries: &[ListedEntry]) -> String {
    render_entry_list_internal(entries, None)
}

fn render_entry_list_internal(entries: &[ListedEntry], use_color: Option<bool>) -> String {
    if entries.is_empty() {
        return "No entries found.\n".to_string();
    }

    let word_width = entries
        .iter()
        .map(|listed| listed.entry.word.width())
        .max()
        .unwrap_or(0)
        .min(MAX_WORD_WIDTH);
    let fixed_width = INDENT.width() + word_width + GAP.width() + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed_width);

    let mut output = String::new();
    for listed in entries {
        let entry = listed.entry;

        let word = truncate_to_width(&entry.word, word_width);
        let word_padding = word_width.saturating_sub(word.width());

        let tags = entry
            .list(TAGS)
            .iter()
            .map(|tag| format!("{}{}", TAG_MARKER, tag))
            .collect::<Vec<_>>()
            .join(" ");
        let tags = truncate_to_width(&tags, available / 2);
        let tags_width = tags.width();

        let separator = if tags.is_empty() { 0 } else { 1 };
        let definition = entry.text(DEFINITION).replace('\n', " ");
        let definition =
            truncate_to_width(&definition, available.saturating_sub(tags_width + separator));

        let body_width = definition.width() + separator + tags_width;
        let padding = available.saturating_sub(body_width);

        let time_ago = match listed.modified {
            Some(timestamp) => format_time_ago(timestamp),
            None => " ".repeat(TIME_WIDTH),
        };

        output.push_str(&format!(
            "{}{}{}{}{}{}{}{}{}\n",
            INDENT,
            styled(names::WORD, &word, use_color),
            " ".repeat(word_padding),
            GAP,
            definition,
            " ".repeat(separator),
            styled(names::TAG, &tags, use_color),
            " ".repeat(padding),
            styled(names::TIME, &time_ago, use_color),
        ));
    }
    output
}

/// Renders every field of `entry`, titled by the module that declared it.
///
/// Synonyms for which `is_entry` returns true are highlighted, since they can
/// be opened with `show`.
pub fn render_entry(entry: &Entry, schema: &Schema, is_entry: impl Fn(&str) -> bool) -> String {
    render_entry_internal(entry, schema, is_entry, None)
}

fn render_entry_internal(
    entry: &Entry,
    schema: &Schema,
    is_entry: impl Fn(&str) -> bool,
    use_color: Option<bool>,
) -> String {
    let mut rows: Vec<(String, String)> = Vec::new();

    for field in schema.fields().iter().filter(|f| f.name != WORD) {
        let title = schema
            .module_title(&field.module)
            .unwrap_or(&field.name)
            .to_string();
        rows.push((title, field.name.clone()));
    }
    for name in entry.fields.keys() {
        if schema.field(name).is_none() {
            rows.push((name.clone(), name.clone()));
        }
    }

    let title_width = rows.iter().map(|(title, _)| title.width()).max().unwrap_or(0);

    let mut output = String::new();
    output.push_str(&format!("{}\n", styled(names::HEADING, &entry.word, use_color)));
    output.push_str("--------------------------------\n");

    for (title, name) in rows {
        let value = match entry.get(&name) {
            Some(value) if value.is_empty() => styled(names::EMPTY_VALUE, EMPTY_VALUE, use_color),
            None => styled(names::EMPTY_VALUE, EMPTY_VALUE, use_color),
            Some(_) if name == SYNONYMS => entry
                .list(SYNONYMS)
                .iter()
                .map(|synonym| {
                    if is_entry(synonym) {
                        styled(names::LINKED, synonym, use_color)
                    } else {
                        synonym.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
            Some(value) => value.to_string(),
        };
        let padding = title_width.saturating_sub(title.width());
        output.push_str(&format!(
            "{}{}{}{}\n",
            styled(names::FIELD_TITLE, &title, use_color),
            " ".repeat(padding),
            GAP,
            value
        ));
    }

    output
}

pub fn render_text_list(lines: &[String], empty_message: &str) -> String {
    if lines.is_empty() {
        return format!("{}\n", empty_message);
    }
    lines.iter().map(|line| format!("{}\n", line)).collect()
}

pub fn render_messages(messages: &[Message]) -> String {
    render_messages_internal(messages, None)
}

fn render_messages_internal(messages: &[Message], use_color: Option<bool>) -> String {
    messages
        .iter()
        .map(|message| {
            let style = match message.level {
                MessageLevel::Info => names::INFO,
                MessageLevel::Success => names::SUCCESS,
                MessageLevel::Warning => names::WARNING,
            };
            format!("{}\n", styled(style, &message.content, use_color))
        })
        .collect()
}

pub fn print_messages(messages: &[Message]) {
    let output = render_messages(messages);
    if !output.is_empty() {
        print!("{}", output);
    }
}

/// Cuts `s` to at most `max_width` columns, ending with '…' when cut.
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let limit = max_width.saturating_sub(1);
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }

    if max_width > 0 {
        result.push('…');
    }
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);

    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    // Units padded to the width of "seconds" so the numbers line up.
    let time_str = time_str
        .replace("hours ago", "  hours ago")
        .replace("hour ago", "   hour ago")
        .replace("days ago", "   days ago")
        .replace("day ago", "    day ago")
        .replace("weeks ago", "  weeks ago")
        .replace("week ago", "   week ago")
        .replace("months ago", " months ago")
        .replace("month ago", "  month ago")
        .replace("years ago", "  years ago")
        .replace("year ago", "   year ago");

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
