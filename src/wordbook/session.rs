//! # Edit Session
//!
//! State machine behind the view/edit workflow.
//!
//! ```text
//!            start_edit / start_new
//!   Viewing ───────────────────────────▶ Editing
//!      ▲  ◀─────────────────────────────   │
//!      │        cancel / save ok           │ select, delete
//!      │                                   ▼
//!      └──────── respond(label) ◀── PendingConfirmation
//! ```
//!
//! The session holds two entries:
//! - `current`: the entry shown, as committed in the store
//! - `working`: a deep copy of `current`, mutated freely while editing
//!
//! Confirmations are suspend points: an operation that needs one returns
//! [`Transition::AwaitingConfirmation`] and the session refuses everything
//! except [`EditSession::respond`] until it is answered. Mutations run to
//! completion inside a single call, so there is never more than one in flight.

use crate::error::{Result, ValidationError, WordbookError};
use crate::model::Entry;
use crate::schema::Schema;
use crate::store::{EntryStore, StorageBackend};
use log::debug;

pub const YES: &str = "yes";
pub const NO: &str = "no";

const YES_NO: &[&str] = &[YES, NO];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Viewing,
    Editing,
}

/// Why the session is waiting on the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// A selection was requested while editing.
    CancelEdit,
    Delete,
}

impl Confirmation {
    pub fn prompt(&self) -> Prompt {
        let message = match self {
            Confirmation::CancelEdit => "cancel edit?",
            Confirmation::Delete => "are you sure?",
        };
        Prompt {
            message,
            buttons: YES_NO,
        }
    }
}

/// What a confirmation dialog has to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub message: &'static str,
    pub buttons: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Viewing,
    Editing,
    PendingConfirmation {
        confirmation: Confirmation,
        /// Mode to return to when the answer does not change it.
        resume: Mode,
    },
}

/// Outcome of a session operation that may need confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Nothing changed; the caller must answer `Prompt` through `respond`.
    AwaitingConfirmation(Prompt),
    /// The user declined; nothing changed.
    Declined,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    state: SessionState,
    current: Entry,
    working: Entry,
    null_entry: Entry,
}

impl EditSession {
    /// A session showing a blank entry.
    pub fn new(schema: &Schema) -> Self {
        let current = schema.blank_entry();
        Self {
            state: SessionState::Viewing,
            working: current.clone(),
            current,
            null_entry: schema.null_entry().clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Viewing or Editing; while a confirmation is pending, the mode it will
    /// fall back to.
    pub fn mode(&self) -> Mode {
        match self.state {
            SessionState::Viewing => Mode::Viewing,
            SessionState::Editing => Mode::Editing,
            SessionState::PendingConfirmation { resume, .. } => resume,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.state == SessionState::Editing
    }

    pub fn pending_prompt(&self) -> Option<Prompt> {
        match self.state {
            SessionState::PendingConfirmation { confirmation, .. } => Some(confirmation.prompt()),
            _ => None,
        }
    }

    pub fn current(&self) -> &Entry {
        &self.current
    }

    pub fn working(&self) -> &Entry {
        &self.working
    }

    /// The working copy, for editing. Only available in `Editing`.
    pub fn working_mut(&mut self) -> Result<&mut Entry> {
        self.ensure_not_pending()?;
        if self.state != SessionState::Editing {
            return Err(WordbookError::NotEditing);
        }
        Ok(&mut self.working)
    }

    fn ensure_not_pending(&self) -> Result<()> {
        match self.state {
            SessionState::PendingConfirmation { confirmation, .. } => Err(
                WordbookError::ConfirmationPending(confirmation.prompt().message.to_string()),
            ),
            _ => Ok(()),
        }
    }

    fn blank(&self) -> Entry {
        self.null_entry.with_fresh_id()
    }

    fn show(&mut self, entry: Entry) {
        self.working = entry.clone();
        self.current = entry;
    }

    fn await_confirmation(&mut self, confirmation: Confirmation) -> Transition {
        let resume = self.mode();
        self.state = SessionState::PendingConfirmation {
            confirmation,
            resume,
        };
        Transition::AwaitingConfirmation(confirmation.prompt())
    }

    /// Shows `entry`. While editing, asks "cancel edit?" first.
    pub fn select(&mut self, entry: &Entry) -> Result<Transition> {
        self.ensure_not_pending()?;
        match self.state {
            SessionState::Editing => Ok(self.await_confirmation(Confirmation::CancelEdit)),
            _ => {
                self.show(entry.clone());
                Ok(Transition::Applied)
            }
        }
    }

    /// Starts editing a blank entry.
    pub fn start_new(&mut self) -> Result<()> {
        self.ensure_not_pending()?;
        let blank = self.blank();
        self.show(blank);
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Starts editing whatever the working copy holds.
    pub fn start_edit(&mut self) -> Result<()> {
        self.ensure_not_pending()?;
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Leaves editing, discarding changes to the working copy.
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_not_pending()?;
        self.working = self.current.clone();
        self.state = SessionState::Viewing;
        Ok(())
    }

    /// Commits the working copy to `store`.
    ///
    /// Validation failures and persistence errors keep the session in
    /// `Editing` with the working copy intact.
    pub fn save<B: StorageBackend>(&mut self, store: &mut EntryStore<B>) -> Result<Entry> {
        self.ensure_not_pending()?;
        if self.state != SessionState::Editing {
            return Err(WordbookError::NotEditing);
        }

        let word = self.working.word.as_str();
        if word.is_empty() {
            return Err(ValidationError::BlankWord.into());
        }

        let existing = store.contains(&self.current);
        if (!existing || word != self.current.word) && store.word_taken(word, Some(&self.current))
        {
            return Err(ValidationError::DuplicateWord(word.to_string()).into());
        }

        let old = existing.then_some(&self.current);
        let committed = store.upsert(old, self.working.clone())?;
        debug!("event=save word=\"{}\"", committed.word);

        self.show(committed.clone());
        self.state = SessionState::Viewing;
        Ok(committed)
    }

    /// Asks "are you sure?" before deleting the current entry.
    pub fn delete(&mut self) -> Result<Transition> {
        self.ensure_not_pending()?;
        Ok(self.await_confirmation(Confirmation::Delete))
    }

    /// Answers the pending confirmation with one of the prompt's buttons.
    ///
    /// An unknown label leaves the confirmation pending. A failed delete
    /// returns the session to where it was and surfaces the error.
    pub fn respond<B: StorageBackend>(
        &mut self,
        response: &str,
        store: &mut EntryStore<B>,
    ) -> Result<Transition> {
        let (confirmation, resume) = match self.state {
            SessionState::PendingConfirmation {
                confirmation,
                resume,
            } => (confirmation, resume),
            _ => return Err(WordbookError::NoPendingConfirmation),
        };

        let accepted = match response {
            YES => true,
            NO => false,
            other => return Err(WordbookError::UnknownResponse(other.to_string())),
        };

        self.state = match resume {
            Mode::Viewing => SessionState::Viewing,
            Mode::Editing => SessionState::Editing,
        };

        if !accepted {
            return Ok(Transition::Declined);
        }

        match confirmation {
            Confirmation::CancelEdit => {
                self.working = self.current.clone();
                self.state = SessionState::Viewing;
            }
            Confirmation::Delete => {
                store.delete(&self.current)?;
                let blank = self.blank();
                self.show(blank);
                self.state = SessionState::Viewing;
            }
        }
        Ok(Transition::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValue;
    use crate::schema::{DEFINITION, TAGS};
    use crate::store::memory::fixtures::BackendFixture;
    use crate::store::memory::MemBackend;

    fn setup() -> (Schema, EntryStore<MemBackend>, EditSession) {
        let schema = Schema::builtin();
        let backend = BackendFixture::new()
            .with_entry("cat", "a small feline", &["animal"])
            .with_entry("dog", "a loyal companion", &["animal"])
            .build();
        let store = EntryStore::load(backend, &schema);
        let session = EditSession::new(&schema);
        (schema, store, session)
    }

    fn select_word(session: &mut EditSession, store: &EntryStore<MemBackend>, word: &str) {
        let entry = store.find_by_word(word).unwrap().clone();
        assert_eq!(session.select(&entry).unwrap(), Transition::Applied);
    }

    fn words(store: &EntryStore<MemBackend>) -> Vec<&str> {
        store.entries().iter().map(|e| e.word.as_str()).collect()
    }

    #[test]
    fn starts_viewing_a_blank_entry() {
        let (schema, _store, session) = setup();
        assert_eq!(session.mode(), Mode::Viewing);
        assert_eq!(session.current(), schema.null_entry());
        assert!(!session.current().is_same_record(schema.null_entry()));
    }

    #[test]
    fn select_while_viewing_refreshes_working_copy() {
        let (_schema, store, mut session) = setup();
        select_word(&mut session, &store, "cat");
        assert_eq!(session.current().word, "cat");
        assert_eq!(session.working(), session.current());
        assert!(session.working().is_same_record(session.current()));
    }

    #[test]
    fn working_copy_is_independent_of_current() {
        let (_schema, store, mut session) = setup();
        select_word(&mut session, &store, "cat");
        session.start_edit().unwrap();
        session
            .working_mut()
            .unwrap()
            .set(DEFINITION, FieldValue::text("changed"));

        assert_eq!(session.current().text(DEFINITION), "a small feline");
        assert_eq!(
            store.find_by_word("cat").unwrap().text(DEFINITION),
            "a small feline"
        );
    }

    #[test]
    fn working_copy_is_read_only_while_viewing() {
        let (_schema, _store, mut session) = setup();
        assert!(matches!(
            session.working_mut(),
            Err(WordbookError::NotEditing)
        ));
    }

    #[test]
    fn cancel_discards_edits() {
        let (_schema, store, mut session) = setup();
        select_word(&mut session, &store, "cat");
        session.start_edit().unwrap();
        session.working_mut().unwrap().word = "kitty".to_string();
        session.cancel().unwrap();

        assert_eq!(session.mode(), Mode::Viewing);
        assert_eq!(session.working().word, "cat");
    }

    #[test]
    fn start_new_edits_a_fresh_blank() {
        let (schema, _store, mut session) = setup();
        session.start_new().unwrap();
        assert_eq!(session.mode(), Mode::Editing);
        assert_eq!(session.current(), schema.null_entry());
        assert_eq!(session.working(), schema.null_entry());
    }

    #[test]
    fn save_new_entry() {
        let (_schema, mut store, mut session) = setup();
        session.start_new().unwrap();
        session.working_mut().unwrap().word = "bee".to_string();
        let committed = session.save(&mut store).unwrap();

        assert_eq!(committed.word, "bee");
        assert_eq!(session.mode(), Mode::Viewing);
        assert_eq!(session.current().word, "bee");
        assert!(session.current().has_field(TAGS));
        assert_eq!(words(&store), vec!["bee", "cat", "dog"]);
    }

    #[test]
    fn save_blank_word_stays_editing() {
        let (_schema, mut store, mut session) = setup();
        session.start_new().unwrap();
        let err = session.save(&mut store).unwrap_err();
        assert!(matches!(
            err,
            WordbookError::Validation(ValidationError::BlankWord)
        ));
        assert_eq!(err.to_string(), "the word cannot be blank");
        assert_eq!(session.mode(), Mode::Editing);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn save_duplicate_word_stays_editing() {
        let (_schema, mut store, mut session) = setup();
        session.start_new().unwrap();
        session.working_mut().unwrap().word = "dog".to_string();
        let err = session.save(&mut store).unwrap_err();
        assert!(matches!(
            err,
            WordbookError::Validation(ValidationError::DuplicateWord(_))
        ));
        assert_eq!(session.mode(), Mode::Editing);
        assert_eq!(session.working().word, "dog");
    }

    #[test]
    fn save_unchanged_word_is_not_a_duplicate_of_itself() {
        let (_schema, mut store, mut session) = setup();
        select_word(&mut session, &store, "cat");
        session.start_edit().unwrap();
        session
            .working_mut()
            .unwrap()
            .set(DEFINITION, FieldValue::text("a cat"));
        session.save(&mut store).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.find_by_word("cat").unwrap().text(DEFINITION), "a cat");
    }

    #[test]
    fn save_rename() {
        let (_schema, mut store, mut session) = setup();
        select_word(&mut session, &store, "cat");
        session.start_edit().unwrap();
        session.working_mut().unwrap().word = "feline".to_string();
        session.save(&mut store).unwrap();

        assert_eq!(words(&store), vec!["dog", "feline"]);
        assert!(!store.backend().contains_key("cat"));
        assert_eq!(session.current().word, "feline");
    }

    #[test]
    fn save_persistence_error_stays_editing() {
        let (_schema, mut store, mut session) = setup();
        store.backend_mut().set_simulate_write_error(true);
        select_word(&mut session, &store, "cat");
        session.start_edit().unwrap();
        session.working_mut().unwrap().word = "feline".to_string();

        assert!(session.save(&mut store).unwrap_err().is_persistence());
        assert_eq!(session.mode(), Mode::Editing);
        assert_eq!(session.working().word, "feline");
        assert_eq!(session.current().word, "cat");
    }

    #[test]
    fn save_requires_editing() {
        let (_schema, mut store, mut session) = setup();
        assert!(matches!(
            session.save(&mut store),
            Err(WordbookError::NotEditing)
        ));
    }

    #[test]
    fn select_while_editing_asks_to_cancel() {
        let (_schema, store, mut session) = setup();
        select_word(&mut session, &store, "cat");
        session.start_edit().unwrap();
        let dog = store.find_by_word("dog").unwrap().clone();

        let transition = session.select(&dog).unwrap();
        assert_eq!(
            transition,
            Transition::AwaitingConfirmation(Confirmation::CancelEdit.prompt())
        );
        assert_eq!(session.pending_prompt().unwrap().message, "cancel edit?");
    }

    #[test]
    fn confirmed_cancel_resynchronizes_working_copy() {
        let (_schema, mut store, mut session) = setup();
        select_word(&mut session, &store, "cat");
        session.start_edit().unwrap();
        session.working_mut().unwrap().word = "kitty".to_string();
        let dog = store.find_by_word("dog").unwrap().clone();
        session.select(&dog).unwrap();

        assert_eq!(
            session.respond(YES, &mut store).unwrap(),
            Transition::Applied
        );
        assert_eq!(session.mode(), Mode::Viewing);
        assert_eq!(session.current().word, "cat");
        assert_eq!(session.working(), session.current());
    }

    #[test]
    fn declined_cancel_keeps_editing() {
        let (_schema, mut store, mut session) = setup();
        select_word(&mut session, &store, "cat");
        session.start_edit().unwrap();
        session.working_mut().unwrap().word = "kitty".to_string();
        let dog = store.find_by_word("dog").unwrap().clone();
        session.select(&dog).unwrap();

        assert_eq!(
            session.respond(NO, &mut store).unwrap(),
            Transition::Declined
        );
        assert_eq!(session.mode(), Mode::Editing);
        assert_eq!(session.current().word, "cat");
        assert_eq!(session.working().word, "kitty");
    }

    #[test]
    fn pending_confirmation_blocks_other_operations() {
        let (_schema, mut store, mut session) = setup();
        select_word(&mut session, &store, "cat");
        session.delete().unwrap();

        assert!(matches!(
            session.start_edit(),
            Err(WordbookError::ConfirmationPending(_))
        ));
        assert!(matches!(
            session.delete(),
            Err(WordbookError::ConfirmationPending(_))
        ));
        assert!(matches!(
            session.save(&mut store),
            Err(WordbookError::ConfirmationPending(_))
        ));
        assert!(session.pending_prompt().is_some());
    }

    #[test]
    fn unknown_response_keeps_confirmation_pending() {
        let (_schema, mut store, mut session) = setup();
        select_word(&mut session, &store, "cat");
        session.delete().unwrap();
        assert!(matches!(
            session.respond("maybe", &mut store),
            Err(WordbookError::UnknownResponse(_))
        ));
        assert!(session.pending_prompt().is_some());
    }

    #[test]
    fn respond_without_pending_confirmation_fails() {
        let (_schema, mut store, mut session) = setup();
        assert!(matches!(
            session.respond(YES, &mut store),
            Err(WordbookError::NoPendingConfirmation)
        ));
    }

    #[test]
    fn confirmed_delete_clears_selection() {
        let (schema, mut store, mut session) = setup();
        select_word(&mut session, &store, "dog");
        assert_eq!(
            session.delete().unwrap(),
            Transition::AwaitingConfirmation(Confirmation::Delete.prompt())
        );
        session.respond(YES, &mut store).unwrap();

        assert_eq!(words(&store), vec!["cat"]);
        assert_eq!(session.current(), schema.null_entry());
        assert_eq!(session.mode(), Mode::Viewing);
    }

    #[test]
    fn declined_delete_changes_nothing() {
        let (_schema, mut store, mut session) = setup();
        select_word(&mut session, &store, "dog");
        session.delete().unwrap();
        assert_eq!(
            session.respond(NO, &mut store).unwrap(),
            Transition::Declined
        );
        assert_eq!(words(&store), vec!["cat", "dog"]);
        assert_eq!(session.current().word, "dog");
    }

    #[test]
    fn failed_delete_keeps_state_and_surfaces_error() {
        let (_schema, mut store, mut session) = setup();
        store.backend_mut().set_simulate_remove_error(true);
        select_word(&mut session, &store, "dog");
        session.start_edit().unwrap();
        session.delete().unwrap();

        assert!(session.respond(YES, &mut store).is_err());
        assert_eq!(session.mode(), Mode::Editing);
        assert_eq!(session.current().word, "dog");
        assert_eq!(words(&store), vec!["cat", "dog"]);
    }
}
