//! Patch engine for jdelta.
//!
//! Walks a changeset against a caller-owned value, mutating it forward in
//! time ([`apply`]) or backward ([`revert`]). Both directions share one
//! engine: reverting swaps additions with removals, writes prior values for
//! updates, and visits changes in reverse order.
//!
//! Targets are mutated in place. Callers that need the original must clone
//! it first.

pub mod apply;
pub mod array;
pub mod config;
pub mod engine;
pub mod error;
pub mod revert;

pub use apply::{apply, apply_with};
pub use config::{MissingPolicy, PatchConfig};
pub use engine::Direction;
pub use error::{PatchError, PatchResult};
pub use revert::{revert, revert_with};
