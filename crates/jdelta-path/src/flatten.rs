//! Change tree to flat entries.

use jdelta_types::{Change, ChangeKind, EmbeddedKey, FlatChange};

use crate::grammar::{Segment, ROOT_MARKER};

/// Flatten a changeset into one entry per leaf, in depth-first order.
pub fn flatten(changes: &[Change]) -> Vec<FlatChange> {
    flatten_from(changes, ROOT_MARKER)
}

/// Flatten a single node.
pub fn flatten_change(change: &Change) -> Vec<FlatChange> {
    flatten(std::slice::from_ref(change))
}

/// Flatten a changeset whose paths start at `base_path` instead of `$`.
///
/// Nodes keyed by the root sentinel address the value at `base_path` and add
/// no segment of their own.
pub fn flatten_from(changes: &[Change], base_path: &str) -> Vec<FlatChange> {
    let mut entries = Vec::new();
    for change in changes {
        if !change.is_root() {
            flatten_node(change, base_path, None, &mut entries);
        } else if change.is_branch() {
            for child in change.children() {
                flatten_node(child, base_path, change.embedded_key.as_ref(), &mut entries);
            }
        } else {
            entries.push(FlatChange::from_leaf(change, base_path));
        }
    }
    entries
}

/// `parent` is the embedded key of the array holding `node`, if any.
fn flatten_node(
    node: &Change,
    path: &str,
    parent: Option<&EmbeddedKey>,
    entries: &mut Vec<FlatChange>,
) {
    let (here, selected) = match parent {
        Some(embedded) => match element_segment(node, embedded) {
            Some(segment) => (extend(path, segment), true),
            None => (path.to_string(), false),
        },
        None if node.is_branch() => (extend(path, Segment::Field(node.key.clone())), false),
        None => (path.to_string(), false),
    };
    if node.is_branch() {
        for child in node.children() {
            flatten_node(child, &here, node.embedded_key.as_ref(), entries);
        }
    } else {
        let path = leaf_path(here, node, selected);
        entries.push(FlatChange::from_leaf(node, path));
    }
}

fn extend(path: &str, segment: Segment) -> String {
    format!("{path}{segment}")
}

/// Segment selecting the array element `node` addresses. An element added
/// to an identity-keyed array has no prior position and gets none.
fn element_segment(node: &Change, embedded: &EmbeddedKey) -> Option<Segment> {
    match embedded {
        EmbeddedKey::Index => Some(match node.key.parse() {
            Ok(index) => Segment::Index(index),
            Err(_) => Segment::Field(node.key.clone()),
        }),
        EmbeddedKey::Field(_) if node.kind == ChangeKind::Add => None,
        EmbeddedKey::Field(field) => Some(Segment::Predicate {
            field: field.clone(),
            value: node.key.clone(),
        }),
    }
}

/// Object-valued leaves and leaves whose element was just selected keep
/// `path`; every other leaf is suffixed with its own key.
fn leaf_path(path: String, node: &Change, selected: bool) -> String {
    let object_valued = node.value.as_ref().is_some_and(|value| value.is_object());
    if object_valued || selected {
        path
    } else {
        extend(&path, Segment::Field(node.key.clone()))
    }
}
