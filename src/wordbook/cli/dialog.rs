use console::Term;
use wordbook::app::ConfirmationDialog;
use wordbook::session::{NO, YES};

/// Asks on the terminal: `are you sure? [yes/no] `.
///
/// Accepts any prefix of a button label ("y", "ye"). Anything else, including
/// a closed or non-interactive stdin, picks "no".
pub struct TerminalDialog {
    term: Term,
}

impl TerminalDialog {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Default for TerminalDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmationDialog for TerminalDialog {
    fn show_confirmation(&mut self, message: &str, buttons: &[&str]) -> String {
        let question = format!("{} [{}] ", message, buttons.join("/"));
        if self.term.write_str(&question).is_err() {
            return NO.to_string();
        }
        match self.term.read_line() {
            Ok(line) => pick_button(&line, buttons).unwrap_or(NO).to_string(),
            Err(_) => NO.to_string(),
        }
    }
}

/// Answers "yes" without asking, for `--yes`.
pub struct AssumeYes;

impl ConfirmationDialog for AssumeYes {
    fn show_confirmation(&mut self, _message: &str, _buttons: &[&str]) -> String {
        YES.to_string()
    }
}

fn pick_button<'b>(answer: &str, buttons: &[&'b str]) -> Option<&'b str> {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        return None;
    }
    buttons
        .iter()
        .find(|button| button.starts_with(answer.as_str()))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_button_by_prefix() {
        let buttons = [YES, NO];
        assert_eq!(pick_button("y", &buttons), Some(YES));
        assert_eq!(pick_button(" Yes\n", &buttons), Some(YES));
        assert_eq!(pick_button("n", &buttons), Some(NO));
    }

    #[test]
    fn unknown_answers_pick_nothing() {
        let buttons = [YES, NO];
        assert_eq!(pick_button("", &buttons), None);
        assert_eq!(pick_button("maybe", &buttons), None);
        assert_eq!(pick_button("yess", &buttons), None);
    }

    #[test]
    fn assume_yes() {
        assert_eq!(AssumeYes.show_confirmation("are you sure?", &[YES, NO]), YES);
    }
}
