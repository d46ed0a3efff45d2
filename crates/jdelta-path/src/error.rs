//! Error types for the path codec.

use jdelta_types::TypeError;
use thiserror::Error;

/// Errors produced while parsing paths or rebuilding change trees.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path {path:?} does not start with '$'")]
    MissingRoot { path: String },

    #[error("unexpected {found:?} at offset {offset} in path {path:?}")]
    UnexpectedChar {
        path: String,
        offset: usize,
        found: char,
    },

    #[error("empty field name at offset {offset} in path {path:?}")]
    EmptyField { path: String, offset: usize },

    #[error("unterminated selector at offset {offset} in path {path:?}")]
    UnterminatedSelector { path: String, offset: usize },

    #[error("invalid array index {text:?} in path {path:?}")]
    InvalidIndex { path: String, text: String },

    /// The entry does not describe a well-formed leaf change.
    #[error(transparent)]
    Malformed(#[from] TypeError),
}

/// Convenience alias for path codec results.
pub type PathResult<T> = Result<T, PathError>;
