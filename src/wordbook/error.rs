use thiserror::Error;

/// Problems with an entry the user is trying to save.
///
/// These are recoverable: the triggering action is blocked and the message
/// is shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the word cannot be blank")]
    BlankWord,

    #[error("the word must be unique: \"{0}\" already exists")]
    DuplicateWord(String),
}

#[derive(Error, Debug)]
pub enum WordbookError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("A confirmation is pending: answer \"{0}\" first")]
    ConfirmationPending(String),

    #[error("No confirmation is pending")]
    NoPendingConfirmation,

    #[error("Unknown confirmation response: {0}")]
    UnknownResponse(String),

    #[error("Not editing: start editing an entry first")]
    NotEditing,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl WordbookError {
    pub fn is_validation(&self) -> bool {
        matches!(self, WordbookError::Validation(_))
    }

    /// Persistence failures are the ones coming from the storage backend.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            WordbookError::Io(_) | WordbookError::Serialization(_) | WordbookError::Store(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WordbookError>;
