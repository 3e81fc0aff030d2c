//! Error types shared by the ranking store, console presenter and robot

use std::path::PathBuf;

/// Errors surfaced by roboter
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not find {name}")]
    TemplateNotFound { name: String },

    #[error("template {template} has no value for ${{{key}}}")]
    MissingPlaceholder { template: String, key: String },

    #[error("invalid template {template}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("ranking file {}: {reason}", path.display())]
    Storage { path: PathBuf, reason: String },

    #[error("restaurant name is empty")]
    EmptyName,

    #[error("input closed while waiting for an answer")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Storage {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
