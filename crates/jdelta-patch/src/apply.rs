//! Changeset applier: move a value forward in time.

use jdelta_types::{Change, Value};

use crate::config::PatchConfig;
use crate::engine::{Direction, Patcher};
use crate::error::PatchResult;

/// Apply `changes` to `target` in place with the default configuration.
///
/// Missing array elements are logged and skipped.
///
/// # Errors
///
/// See [`apply_with`].
pub fn apply(target: &mut Value, changes: &[Change]) -> PatchResult<()> {
    apply_with(target, changes, &PatchConfig::default())
}

/// Apply `changes` to `target` in place.
///
/// # Errors
///
/// - `Malformed` -- a node violates the change shape rules
/// - `InvalidIndex` -- a positional update or descent has a non-numeric key
/// - `NotAContainer` -- a branch addresses a scalar
/// - `MissingElement` -- nothing matched, under [`MissingPolicy::Fail`](crate::MissingPolicy::Fail)
pub fn apply_with(target: &mut Value, changes: &[Change], config: &PatchConfig) -> PatchResult<()> {
    Patcher::new(Direction::Forward, config).run(target, changes)
}
