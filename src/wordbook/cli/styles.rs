use console::Style;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub mod names {
    pub const WORD: &str = "word";
    pub const TAG: &str = "tag";
    pub const TIME: &str = "time";
    pub const FIELD_TITLE: &str = "field_title";
    pub const EMPTY_VALUE: &str = "empty_value";
    pub const LINKED: &str = "linked";
    pub const HEADING: &str = "heading";
    pub const INFO: &str = "info";
    pub const SUCCESS: &str = "success";
    pub const WARNING: &str = "warning";
}

pub static WORDBOOK_THEME: Lazy<HashMap<&'static str, Style>> = Lazy::new(|| {
    HashMap::from([
        (names::WORD, Style::new().bold()),
        (names::TAG, Style::new().cyan().dim()),
        (names::TIME, Style::new().color256(247).italic()),
        (names::FIELD_TITLE, Style::new().yellow()),
        (names::EMPTY_VALUE, Style::new().dim()),
        (names::LINKED, Style::new().green().underlined()),
        (names::HEADING, Style::new().bold()),
        (names::INFO, Style::new().dim()),
        (names::SUCCESS, Style::new().green()),
        (names::WARNING, Style::new().yellow()),
    ])
});

/// Applies the themed style `name` to `text`.
///
/// `use_color` forces styling on or off; `None` leaves it to terminal
/// detection.
pub fn styled(name: &str, text: &str, use_color: Option<bool>) -> String {
    let style = WORDBOOK_THEME.get(name).cloned().unwrap_or_default();
    let style = match use_color {
        Some(force) => style.force_styling(force),
        None => style,
    };
    style.apply_to(text).to_string()
}
