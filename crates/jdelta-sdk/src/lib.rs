//! High-level API for jdelta.
//!
//! Re-exports the value and change model and puts the diff, patch, and path
//! engines behind free functions and a [`Delta`] handle. This is the main
//! entry point for applications embedding jdelta.

pub mod delta;
pub mod error;
pub mod ops;

pub use delta::Delta;
pub use error::{SdkError, SdkResult};
pub use ops::{
    applied, apply, diff, diff_with, flatten, flatten_from, revert, reverted, unflatten,
    unflatten_entry, validate,
};

// Re-export key types
pub use jdelta_diff::{FieldIdentity, FnIdentity, IdentityResolver, IdentityRules};
pub use jdelta_patch::{MissingPolicy, PatchConfig};
pub use jdelta_path::{format_path, parse_path, Segment};
pub use jdelta_types::{
    classify, Change, ChangeKind, Changeset, EmbeddedKey, FlatChange, Map, Value, ValueType,
    ROOT_KEY,
};
