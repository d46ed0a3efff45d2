//! Path codec for jdelta.
//!
//! Converts between the nested change tree and a flat list of leaf entries,
//! each addressed by a `$`-rooted path:
//!
//! - `.<field>` -- object member
//! - `[<n>]` -- array element by position
//! - `[?(@.<field>='<value>')]` -- array element by identity
//!
//! Nodes keyed by the root sentinel add no segment, so an element of a root
//! array is `$[0]`, not `$.$root[0]`. An element added to an identity-keyed
//! array has no prior position and keeps the array's own path (`$.people`,
//! or `$.tags.x` for a non-object element).
//!
//! Field names and identity values are not escaped. Keys containing `.`,
//! `[`, or the `')]` sequence produce paths that do not parse back to the
//! same tree.

pub mod error;
pub mod flatten;
pub mod grammar;
pub mod unflatten;

pub use error::{PathError, PathResult};
pub use flatten::{flatten, flatten_change, flatten_from};
pub use grammar::{format_path, parse_path, Segment, ROOT_MARKER};
pub use unflatten::{unflatten, unflatten_entry};
