//! Error types for the patch crate.

use jdelta_types::{TypeError, ValueType};
use thiserror::Error;

/// Errors that abort applying or reverting a changeset.
///
/// Changes already performed before the error are not rolled back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// A change node violates the leaf/branch shape rules.
    #[error(transparent)]
    Malformed(#[from] TypeError),

    /// A positional array change whose key is not an index.
    #[error("invalid array index {key:?}")]
    InvalidIndex { key: String },

    /// A change descends into a value that is neither object nor array.
    #[error("change at key {key:?} addresses a {found} value, not a container")]
    NotAContainer { key: String, found: ValueType },

    /// No element or member matched; only raised under [`MissingPolicy::Fail`].
    ///
    /// [`MissingPolicy::Fail`]: crate::config::MissingPolicy::Fail
    #[error("no element with {embedded_key} = {key:?} in target")]
    MissingElement { embedded_key: String, key: String },
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, PatchError>;
