use std::path::{Path, PathBuf};

/// Convenience result type used across deckform.
pub type DeckResult<T> = Result<T, DeckError>;

/// Top-level error taxonomy used by conversion APIs.
///
/// Quality-gate failures and retry exhaustion are not errors; they are reported through
/// [`crate::ItemResult`].
#[derive(thiserror::Error, Debug)]
pub enum DeckError {
    /// A source deck or template could not be read or parsed.
    #[error("load error: '{}': {msg}", path.display())]
    Load {
        /// Offending input path.
        path: PathBuf,
        /// Parser or reader message.
        msg: String,
    },

    /// Writing an output file failed.
    #[error("io error: '{}': {source}", path.display())]
    Io {
        /// Offending output path.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// An item could not be rasterized.
    #[error("render error: {0}")]
    Render(String),

    /// A workflow run reached a state it must never reach.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// Invalid user-provided options or document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeckError {
    /// Build a [`DeckError::Load`] value.
    pub fn load(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Self::Load {
            path: path.as_ref().to_path_buf(),
            msg: msg.into(),
        }
    }

    /// Build a [`DeckError::Io`] value.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a [`DeckError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`DeckError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`DeckError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
