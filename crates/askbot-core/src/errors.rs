use std::path::PathBuf;

/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the dispatcher
/// can report failures consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("storage unavailable: {path}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("answer service error: {0}")]
    ExternalService(String),

    #[error("messaging error: {0}")]
    Messaging(String),

    /// The messenger could not parse the markup of an outgoing message.
    #[error("markup rejected: {0}")]
    MarkupRejected(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Error::StorageUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
