use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A change kind spelling outside `ADD`, `REMOVE`, `UPDATE`.
    #[error("unrecognized change operation: {0:?}")]
    UnknownOperation(String),

    /// A change node whose fields violate the leaf/branch shape rules.
    #[error("malformed change at key {key:?}: {reason}")]
    MalformedChange { key: String, reason: String },
}

/// Convenience alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
