//! # Application Controller
//!
//! [`App`] is the application state of a wordbook: the schema, the entry
//! store, the edit session and the search text, owned in one place and
//! handed to UI layers by reference.
//!
//! It does not render anything. UIs either poll it or [`App::subscribe`] to
//! [`AppEvent`]s, which are emitted after each operation that changed
//! something.
//!
//! ## Confirmations
//!
//! Operations that may need a yes/no answer take a [`ConfirmationDialog`]
//! and resolve the session's suspend point on the spot. Event-driven UIs
//! that cannot block can call the session-level operation and answer later
//! through [`App::respond`].
//!
//! ## Lifecycle
//!
//! ```text
//! App::open(schema, backend, &settings)   load store, restore search + selection
//!   ... operations ...
//! App::shutdown(&mut settings)            remember selection + search
//! ```

use crate::error::{Result, WordbookError};
use crate::model::{Entry, EntryId};
use crate::schema::Schema;
use crate::search;
use crate::session::{EditSession, Mode, Prompt, Transition, NO};
use crate::settings::{Settings, LAST_SEARCH_TEXT, LAST_SELECTED_WORD};
use crate::store::{EntryStore, StorageBackend};
use log::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    EntriesChanged,
    SelectionChanged { word: String },
    ModeChanged(Mode),
    SearchChanged(String),
    ConfirmationRequested(Prompt),
}

/// Asks the user to pick one of `buttons` and returns the chosen label.
pub trait ConfirmationDialog {
    fn show_confirmation(&mut self, message: &str, buttons: &[&str]) -> String;
}

impl<F> ConfirmationDialog for F
where
    F: FnMut(&str, &[&str]) -> String,
{
    fn show_confirmation(&mut self, message: &str, buttons: &[&str]) -> String {
        (self)(message, buttons)
    }
}

type Observer = Box<dyn FnMut(&AppEvent)>;

struct Snapshot {
    revision: u64,
    mode: Mode,
    current: EntryId,
    word: String,
}

pub struct App<B: StorageBackend> {
    schema: Schema,
    store: EntryStore<B>,
    session: EditSession,
    search_text: String,
    observers: Vec<Observer>,
}

impl<B: StorageBackend> App<B> {
    pub fn new(schema: Schema, backend: B) -> Self {
        let store = EntryStore::load(backend, &schema);
        let session = EditSession::new(&schema);
        Self {
            schema,
            store,
            session,
            search_text: String::new(),
            observers: Vec::new(),
        }
    }

    /// Loads the store and restores the state saved by [`App::shutdown`].
    pub fn open(schema: Schema, backend: B, settings: &Settings) -> Self {
        let mut app = Self::new(schema, backend);
        app.restore(settings);
        app
    }

    pub fn restore(&mut self, settings: &Settings) {
        self.search_text = settings.get(LAST_SEARCH_TEXT).unwrap_or_default().to_string();

        let last_word = settings.get(LAST_SELECTED_WORD).unwrap_or_default();
        match self.store.find_by_word(last_word).cloned() {
            Some(entry) => {
                if let Err(e) = self.session.select(&entry) {
                    warn!("event=restore_selection status=failed reason=\"{}\"", e);
                }
            }
            None if !last_word.is_empty() => {
                debug!("event=restore_selection status=missing word=\"{}\"", last_word);
            }
            None => {}
        }
    }

    pub fn shutdown(&self, settings: &mut Settings) {
        settings.set(LAST_SELECTED_WORD, self.session.current().word.as_str());
        settings.set(LAST_SEARCH_TEXT, self.search_text.as_str());
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&AppEvent) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: AppEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.store.revision(),
            mode: self.session.mode(),
            current: self.session.current().id(),
            word: self.session.current().word.clone(),
        }
    }

    /// Runs `op` and emits an event for every part of the state it changed,
    /// whether it succeeded or not.
    fn tracked<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let before = self.snapshot();
        let result = op(self);
        let after = self.snapshot();

        if after.revision != before.revision {
            self.emit(AppEvent::EntriesChanged);
        }
        if after.current != before.current || after.word != before.word {
            self.emit(AppEvent::SelectionChanged { word: after.word });
        }
        if after.mode != before.mode {
            self.emit(AppEvent::ModeChanged(after.mode));
        }
        result
    }

    fn resolve<D>(&mut self, transition: Transition, dialog: &mut D) -> Result<Transition>
    where
        D: ConfirmationDialog + ?Sized,
    {
        let prompt = match transition {
            Transition::AwaitingConfirmation(prompt) => prompt,
            other => return Ok(other),
        };

        self.emit(AppEvent::ConfirmationRequested(prompt));
        let mut answer = dialog.show_confirmation(prompt.message, prompt.buttons);
        if !prompt.buttons.contains(&answer.as_str()) {
            warn!(
                "event=confirmation status=unknown_answer answer=\"{}\" fallback=\"{}\"",
                answer, NO
            );
            answer = NO.to_string();
        }
        self.session.respond(&answer, &mut self.store)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &EntryStore<B> {
        &self.store
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn entries(&self) -> &[Entry] {
        self.store.entries()
    }

    pub fn current_entry(&self) -> &Entry {
        self.session.current()
    }

    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.search_text {
            self.search_text = text;
            self.emit(AppEvent::SearchChanged(self.search_text.clone()));
        }
    }

    /// Entries matching the current search text.
    pub fn filtered_entries(&self) -> Vec<&Entry> {
        search::filter(self.store.entries(), &self.search_text)
    }

    /// Shows every entry carrying `tag`.
    pub fn select_tag(&mut self, tag: &str) {
        self.set_search_text(search::tag_query(tag));
    }

    pub fn module_title(&self, module_name: &str) -> Option<&str> {
        self.schema.module_title(module_name)
    }

    pub fn select<D>(&mut self, entry: &Entry, dialog: &mut D) -> Result<Transition>
    where
        D: ConfirmationDialog + ?Sized,
    {
        self.tracked(|app| {
            let transition = app.session.select(entry)?;
            app.resolve(transition, dialog)
        })
    }

    /// Selects the entry for `word`, e.g. when following a synonym.
    pub fn select_word<D>(&mut self, word: &str, dialog: &mut D) -> Result<Transition>
    where
        D: ConfirmationDialog + ?Sized,
    {
        let entry = self
            .store
            .find_by_word(word)
            .cloned()
            .ok_or_else(|| WordbookError::EntryNotFound(word.to_string()))?;
        self.select(&entry, dialog)
    }

    pub fn new_entry(&mut self) -> Result<()> {
        self.tracked(|app| app.session.start_new())
    }

    pub fn edit_entry(&mut self) -> Result<()> {
        self.tracked(|app| app.session.start_edit())
    }

    pub fn cancel_edit(&mut self) -> Result<()> {
        self.tracked(|app| app.session.cancel())
    }

    /// The working copy of the entry being edited.
    pub fn working_mut(&mut self) -> Result<&mut Entry> {
        self.session.working_mut()
    }

    pub fn save_entry(&mut self) -> Result<Entry> {
        self.tracked(|app| app.session.save(&mut app.store))
    }

    pub fn delete_entry<D>(&mut self, dialog: &mut D) -> Result<Transition>
    where
        D: ConfirmationDialog + ?Sized,
    {
        self.tracked(|app| {
            let transition = app.session.delete()?;
            app.resolve(transition, dialog)
        })
    }

    /// Starts a delete and leaves the confirmation pending.
    pub fn request_delete(&mut self) -> Result<Prompt> {
        let transition = self.tracked(|app| app.session.delete())?;
        match transition {
            Transition::AwaitingConfirmation(prompt) => {
                self.emit(AppEvent::ConfirmationRequested(prompt));
                Ok(prompt)
            }
            _ => Err(WordbookError::NoPendingConfirmation),
        }
    }

    /// Answers a confirmation left pending by [`App::request_delete`] or a
    /// session-level call.
    pub fn respond(&mut self, answer: &str) -> Result<Transition> {
        self.tracked(|app| app.session.respond(answer, &mut app.store))
    }
}
