use thiserror::Error;

/// Word-provider and word-list decoding failures.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown word list `{0}`")]
    UnknownList(String),
    #[error("malformed word list: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures while loading a session. The only fatal class: the session
/// transitions to `Aborted` and retains no partial state.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no learning plan found for list `{0}`")]
    PlanNotFound(String),
    #[error("failed to load words: {0}")]
    Provider(#[from] ProviderError),
}

/// Progress-sync failures. Non-fatal: surfaced as a transient notice
/// while the session continues.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("progress store error: {0}")]
    Store(String),
}

impl From<rusqlite::Error> for SyncError {
    fn from(e: rusqlite::Error) -> Self {
        SyncError::Store(e.to_string())
    }
}
