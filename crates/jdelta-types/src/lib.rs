//! Foundation types for jdelta.
//!
//! Every other jdelta crate depends on `jdelta-types`. It defines the value
//! graph that diffs are computed over and the change nodes that describe a
//! difference.
//!
//! # Key Types
//!
//! - [`Value`] -- Closed sum type over JSON-like values plus dates and opaque functions
//! - [`ValueType`] / [`classify`] -- Semantic kind of a value
//! - [`Change`] / [`ChangeKind`] / [`EmbeddedKey`] -- Nested change tree
//! - [`FlatChange`] -- Path-addressed leaf change

pub mod change;
pub mod classify;
pub mod error;
pub mod flat;
pub mod value;

pub use change::{Change, ChangeKind, Changeset, EmbeddedKey, INDEX_KEY, ROOT_KEY};
pub use classify::{classify, ValueType};
pub use error::{TypeError, TypeResult};
pub use flat::FlatChange;
pub use value::{FunctionRef, Map, Value};
