//! Free-function facade over the engines.

use jdelta_diff::IdentityRules;
use jdelta_patch::PatchConfig;
use jdelta_types::{Change, Changeset, FlatChange, Value};

use crate::error::SdkResult;

/// Diff two values, comparing every array by position.
pub fn diff(old: &Value, new: &Value) -> Changeset {
    jdelta_diff::diff(old, new, &IdentityRules::new())
}

/// Diff two values, matching arrays by `rules`.
pub fn diff_with(old: &Value, new: &Value, rules: &IdentityRules) -> Changeset {
    jdelta_diff::diff(old, new, rules)
}

/// Apply `changes` to `target` in place.
pub fn apply(target: &mut Value, changes: &[Change]) -> SdkResult<()> {
    jdelta_patch::apply(target, changes)?;
    Ok(())
}

/// Revert `changes` from `target` in place.
pub fn revert(target: &mut Value, changes: &[Change]) -> SdkResult<()> {
    jdelta_patch::revert(target, changes)?;
    Ok(())
}

/// Apply `changes` to a copy of `target`, leaving `target` untouched.
pub fn applied(target: &Value, changes: &[Change], config: &PatchConfig) -> SdkResult<Value> {
    let mut next = target.clone();
    jdelta_patch::apply_with(&mut next, changes, config)?;
    Ok(next)
}

/// Revert `changes` from a copy of `target`, leaving `target` untouched.
pub fn reverted(target: &Value, changes: &[Change], config: &PatchConfig) -> SdkResult<Value> {
    let mut prev = target.clone();
    jdelta_patch::revert_with(&mut prev, changes, config)?;
    Ok(prev)
}

pub fn flatten(changes: &[Change]) -> Vec<FlatChange> {
    jdelta_path::flatten(changes)
}

pub fn flatten_from(changes: &[Change], base_path: &str) -> Vec<FlatChange> {
    jdelta_path::flatten_from(changes, base_path)
}

pub fn unflatten(entries: &[FlatChange]) -> SdkResult<Changeset> {
    Ok(jdelta_path::unflatten(entries)?)
}

pub fn unflatten_entry(entry: &FlatChange) -> SdkResult<Change> {
    Ok(jdelta_path::unflatten_entry(entry)?)
}

/// Check the shape of every node in a changeset, e.g. one deserialized from
/// an untrusted source, before applying it.
pub fn validate(changes: &[Change]) -> SdkResult<()> {
    for change in changes {
        change.validate_tree()?;
    }
    Ok(())
}
