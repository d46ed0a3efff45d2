//! The shared walk behind [`apply`](crate::apply) and [`revert`](crate::revert).

use jdelta_types::{classify, Change, ChangeKind, TypeError, Value};
use tracing::{debug, warn};

use crate::config::{MissingPolicy, PatchConfig};
use crate::error::{PatchError, PatchResult};

/// Which way a changeset is walked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Old value to new value.
    Forward,
    /// New value to old value.
    Backward,
}

/// A leaf change reduced to what it does to its slot in this direction.
#[derive(Clone, Copy, Debug)]
pub(crate) enum LeafOp<'c> {
    Insert(&'c Value),
    Delete,
    Set(&'c Value),
}

pub(crate) struct Patcher<'a> {
    direction: Direction,
    config: &'a PatchConfig,
}

impl<'a> Patcher<'a> {
    pub(crate) fn new(direction: Direction, config: &'a PatchConfig) -> Self {
        Self { direction, config }
    }

    /// Walk a root-level changeset. Nodes keyed by the root sentinel address
    /// `target` itself; all others address its members.
    pub(crate) fn run(&self, target: &mut Value, changes: &[Change]) -> PatchResult<()> {
        for node in self.ordered(changes) {
            node.validate()?;
            if node.is_root() {
                self.patch_root(target, node)?;
            } else {
                self.patch_member(target, node)?;
            }
        }
        Ok(())
    }

    /// Changes in the order this direction visits them.
    pub(crate) fn ordered<'c>(&self, changes: &'c [Change]) -> Vec<&'c Change> {
        match self.direction {
            Direction::Forward => changes.iter().collect(),
            Direction::Backward => changes.iter().rev().collect(),
        }
    }

    pub(crate) fn leaf_op<'c>(&self, node: &'c Change) -> PatchResult<LeafOp<'c>> {
        let value = node.value.as_ref();
        let op = match (self.direction, node.kind) {
            (Direction::Forward, ChangeKind::Add) => value.map(LeafOp::Insert),
            (Direction::Forward, ChangeKind::Update) => value.map(LeafOp::Set),
            (Direction::Forward, ChangeKind::Remove) | (Direction::Backward, ChangeKind::Add) => {
                Some(LeafOp::Delete)
            }
            (Direction::Backward, ChangeKind::Remove) => value.map(LeafOp::Insert),
            (Direction::Backward, ChangeKind::Update) => node.old_value.as_ref().map(LeafOp::Set),
        };
        op.ok_or_else(|| {
            PatchError::Malformed(TypeError::MalformedChange {
                key: node.key.clone(),
                reason: format!("{} leaf carries no value to write", node.kind),
            })
        })
    }

    fn patch_root(&self, target: &mut Value, node: &Change) -> PatchResult<()> {
        if node.is_branch() {
            return self.patch_container(target, node);
        }
        *target = match self.leaf_op(node)? {
            LeafOp::Insert(value) | LeafOp::Set(value) => value.clone(),
            LeafOp::Delete => Value::Undefined,
        };
        Ok(())
    }

    /// Apply `node` to the member it addresses inside `container`.
    fn patch_member(&self, container: &mut Value, node: &Change) -> PatchResult<()> {
        match container {
            Value::Object(map) => {
                if node.is_branch() {
                    return match map.get_mut(&node.key) {
                        Some(child) => self.patch_container(child, node),
                        None => self.missing("member", &node.key),
                    };
                }
                match self.leaf_op(node)? {
                    LeafOp::Insert(value) | LeafOp::Set(value) => {
                        map.insert(node.key.clone(), value.clone());
                    }
                    LeafOp::Delete => {
                        if map.shift_remove(&node.key).is_none() {
                            debug!(key = %node.key, "member already absent");
                        }
                    }
                }
                Ok(())
            }
            Value::Array(items) => self.patch_array(items, std::slice::from_ref(node), None),
            other => Err(PatchError::NotAContainer {
                key: node.key.clone(),
                found: classify(other),
            }),
        }
    }

    /// Apply a branch node's children to `target`, the value it addresses.
    pub(crate) fn patch_container(&self, target: &mut Value, node: &Change) -> PatchResult<()> {
        if let Value::Array(items) = target {
            return self.patch_array(items, node.children(), node.embedded_key.as_ref());
        }
        if !target.is_object() {
            return Err(PatchError::NotAContainer {
                key: node.key.clone(),
                found: classify(target),
            });
        }
        for child in self.ordered(node.children()) {
            child.validate()?;
            self.patch_member(target, child)?;
        }
        Ok(())
    }

    /// Report a change that found nothing to act on, per the missing policy.
    pub(crate) fn missing(&self, embedded_key: &str, key: &str) -> PatchResult<()> {
        match self.config.on_missing {
            MissingPolicy::Warn => {
                warn!(
                    embedded_key,
                    key,
                    direction = ?self.direction,
                    "element not found in target; skipping change"
                );
                Ok(())
            }
            MissingPolicy::Fail => Err(PatchError::MissingElement {
                embedded_key: embedded_key.to_string(),
                key: key.to_string(),
            }),
        }
    }
}
