// Error types

/// Top-level error type for the todo store.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// Task text was empty (or whitespace-only) after trimming.
    #[error("task text is empty")]
    EmptyTaskText,

    /// The persisted task list failed to parse.
    #[error("malformed persisted task list: {0}")]
    MalformedPersistedState(String),

    /// Key-value backend failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for TodoError {
    fn from(e: rusqlite::Error) -> Self {
        TodoError::Storage(e.to_string())
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TodoError>;
