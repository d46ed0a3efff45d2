//! Flat entries back to a change tree.
//!
//! Each entry becomes a chain of UPDATE branches ending in its leaf. A chain
//! is merged into the previous one while they share a prefix, so entries
//! produced by [`flatten`](crate::flatten) rebuild the tree they came from.

use jdelta_types::{Change, ChangeKind, Changeset, EmbeddedKey, FlatChange, ROOT_KEY};
use tracing::debug;

use crate::error::PathResult;
use crate::grammar::{parse_path, Segment};

/// Rebuild a changeset from flat entries.
///
/// # Errors
///
/// A [`PathError`](crate::PathError) for the first entry whose path does not
/// parse or whose leaf is malformed.
pub fn unflatten(entries: &[FlatChange]) -> PathResult<Changeset> {
    let mut changes = Changeset::new();
    for entry in entries {
        let node = unflatten_entry(entry)?;
        match changes.last_mut() {
            Some(last) if adds_root_element(last, &node) => {
                last.changes.get_or_insert_with(Vec::new).push(node);
            }
            _ => merge_into(&mut changes, node),
        }
    }
    Ok(changes)
}

/// An addition at the bare root path right after a branch into the root
/// array is an element of that array, not a member of the root.
fn adds_root_element(last: &Change, node: &Change) -> bool {
    last.is_root()
        && last.is_branch()
        && last.embedded_key.is_some()
        && node.is_leaf()
        && !node.is_root()
        && node.kind == ChangeKind::Add
}

/// Rebuild the root-level node for a single entry.
///
/// # Errors
///
/// See [`unflatten`].
pub fn unflatten_entry(entry: &FlatChange) -> PathResult<Change> {
    let segments = parse_path(&entry.path)?;
    let mut steps: Vec<Step> = Vec::with_capacity(segments.len() + 1);
    for segment in &segments {
        match segment {
            Segment::Field(name) => steps.push(Step::member(name.clone())),
            Segment::Index(index) => select(&mut steps, EmbeddedKey::Index, index.to_string()),
            Segment::Predicate { field, value } => {
                select(&mut steps, EmbeddedKey::Field(field.clone()), value.clone())
            }
        }
    }

    // The last step names the leaf itself unless the leaf is an object kept
    // at its parent's path. An object kept at an element's path is told
    // apart from the element by its key.
    let names_leaf = match segments.last() {
        None => false,
        Some(Segment::Field(_)) => !entry.is_object_valued(),
        Some(_) => {
            !entry.is_object_valued() || steps.last().is_some_and(|step| step.key == entry.key)
        }
    };
    let leaf = if names_leaf {
        match (segments.last(), steps.pop()) {
            (Some(last), Some(step)) if last.is_selector() => entry.leaf_at(step.key),
            _ => entry.to_leaf(),
        }
    } else {
        entry.to_leaf()
    };
    leaf.validate()?;

    Ok(steps.into_iter().rev().fold(leaf, |child, step| match step.embedded_key {
        Some(embedded) => Change::array_branch(step.key, embedded, vec![child]),
        None => Change::branch(step.key, vec![child]),
    }))
}

struct Step {
    key: String,
    embedded_key: Option<EmbeddedKey>,
}

impl Step {
    fn member(key: String) -> Self {
        Self {
            key,
            embedded_key: None,
        }
    }
}

/// Mark the current step as an array matched by `embedded` and descend
/// into the element `key`. A leading selector addresses the root value.
fn select(steps: &mut Vec<Step>, embedded: EmbeddedKey, key: String) {
    match steps.last_mut() {
        Some(last) => last.embedded_key = Some(embedded),
        None => steps.push(Step {
            key: ROOT_KEY.to_string(),
            embedded_key: Some(embedded),
        }),
    }
    steps.push(Step::member(key));
}

fn merge_into(siblings: &mut Vec<Change>, node: Change) {
    if let Some(last) = siblings.last_mut() {
        if mergeable(last, &node) {
            debug!(key = %node.key, "merging shared path prefix");
            if last.embedded_key.is_none() {
                last.embedded_key = node.embedded_key;
            }
            let children = last.changes.get_or_insert_with(Vec::new);
            for child in node.changes.unwrap_or_default() {
                merge_into(children, child);
            }
            return;
        }
    }
    siblings.push(node);
}

/// Two branches address the same container when their keys match and their
/// embedded keys agree. A path that reaches an array without selecting an
/// element carries no embedded key, which agrees with any.
fn mergeable(last: &Change, node: &Change) -> bool {
    last.is_branch()
        && node.is_branch()
        && last.key == node.key
        && match (&last.embedded_key, &node.embedded_key) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
}
