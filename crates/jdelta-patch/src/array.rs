//! Array changes, positional and identity-keyed.
//!
//! Positional insertions and removals are collected per branch and
//! performed after the branch's other changes, so their effect does not
//! depend on visiting order. A removal and an insertion at the same index
//! replace the element in place; any other insertion appends.

use std::collections::{BTreeMap, BTreeSet};

use jdelta_types::{Change, EmbeddedKey, Value};

use crate::engine::{LeafOp, Patcher};
use crate::error::{PatchError, PatchResult};

/// Identity of `element` under `field`, rendered the way the diff keyed it.
pub fn element_identity(element: &Value, field: &str) -> String {
    element
        .get(field)
        .unwrap_or(&Value::Undefined)
        .identity_string()
}

/// Position of the first element whose identity under `field` is `key`.
pub fn position_of(items: &[Value], field: &str, key: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item.is_object() && element_identity(item, field) == key)
}

#[derive(Default)]
struct SlotEdits {
    removed: BTreeSet<usize>,
    placed: BTreeMap<usize, Value>,
    appended: Vec<Value>,
}

impl SlotEdits {
    /// Last element equal to `value` that is not already marked for removal.
    fn last_equal(&self, items: &[Value], value: &Value) -> Option<usize> {
        items
            .iter()
            .enumerate()
            .rev()
            .find(|(index, item)| *item == value && !self.removed.contains(index))
            .map(|(index, _)| index)
    }

    fn finish(self, items: &mut Vec<Value>) {
        let SlotEdits {
            mut removed,
            placed,
            appended,
        } = self;
        let mut tail = Vec::new();
        for (index, value) in placed {
            if index < items.len() && removed.remove(&index) {
                items[index] = value;
            } else {
                tail.push(value);
            }
        }
        for index in removed.into_iter().rev() {
            if index < items.len() {
                items.remove(index);
            }
        }
        items.extend(tail);
        items.extend(appended);
    }
}

fn parse_index(key: &str) -> PatchResult<usize> {
    key.parse().map_err(|_| PatchError::InvalidIndex {
        key: key.to_string(),
    })
}

impl Patcher<'_> {
    /// Apply `changes` to the elements of an array. Without an embedded key
    /// the changes carry no element address: insertions append and
    /// deletions match the element by value.
    pub(crate) fn patch_array(
        &self,
        items: &mut Vec<Value>,
        changes: &[Change],
        embedded_key: Option<&EmbeddedKey>,
    ) -> PatchResult<()> {
        match embedded_key {
            Some(EmbeddedKey::Field(field)) => self.patch_keyed(items, changes, field),
            Some(EmbeddedKey::Index) => self.patch_positional(items, changes, true),
            None => self.patch_positional(items, changes, false),
        }
    }

    fn patch_positional(
        &self,
        items: &mut Vec<Value>,
        changes: &[Change],
        indexed: bool,
    ) -> PatchResult<()> {
        let mut edits = SlotEdits::default();
        for node in self.ordered(changes) {
            node.validate()?;
            if node.is_branch() {
                let index = parse_index(&node.key)?;
                match items.get_mut(index) {
                    Some(element) => self.patch_container(element, node)?,
                    None => self.missing(EmbeddedKey::Index.as_str(), &node.key)?,
                }
                continue;
            }
            let position = node.key.parse::<usize>().ok().filter(|_| indexed);
            match (self.leaf_op(node)?, position) {
                (LeafOp::Insert(value), Some(index)) => {
                    edits.placed.insert(index, value.clone());
                }
                (LeafOp::Insert(value), None) => edits.appended.push(value.clone()),
                (LeafOp::Set(value), _) => match items.get_mut(parse_index(&node.key)?) {
                    Some(slot) => *slot = value.clone(),
                    None => self.missing(EmbeddedKey::Index.as_str(), &node.key)?,
                },
                (LeafOp::Delete, Some(index)) => {
                    if index < items.len() {
                        edits.removed.insert(index);
                    } else {
                        self.missing(EmbeddedKey::Index.as_str(), &node.key)?;
                    }
                }
                (LeafOp::Delete, None) => {
                    let found = node
                        .value
                        .as_ref()
                        .and_then(|value| edits.last_equal(items, value));
                    match found {
                        Some(index) => {
                            edits.removed.insert(index);
                        }
                        None => self.missing("value", &node.key)?,
                    }
                }
            }
        }
        edits.finish(items);
        Ok(())
    }

    fn patch_keyed(&self, items: &mut Vec<Value>, changes: &[Change], field: &str) -> PatchResult<()> {
        for node in self.ordered(changes) {
            node.validate()?;
            let position = position_of(items, field, &node.key);
            if node.is_branch() {
                match position {
                    Some(i) => self.patch_container(&mut items[i], node)?,
                    None => self.missing(field, &node.key)?,
                }
                continue;
            }
            match (self.leaf_op(node)?, position) {
                (LeafOp::Insert(value), _) => items.push(value.clone()),
                (LeafOp::Set(value), Some(i)) => items[i] = value.clone(),
                (LeafOp::Delete, Some(i)) => {
                    items.remove(i);
                }
                (LeafOp::Set(_) | LeafOp::Delete, None) => self.missing(field, &node.key)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MissingPolicy, PatchConfig};
    use crate::engine::Direction;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn forward(items: &mut Vec<Value>, changes: &[Change], key: EmbeddedKey) -> PatchResult<()> {
        let config = PatchConfig::default();
        Patcher::new(Direction::Forward, &config).patch_array(items, changes, Some(&key))
    }

    fn backward(items: &mut Vec<Value>, changes: &[Change], key: EmbeddedKey) -> PatchResult<()> {
        let config = PatchConfig::default();
        Patcher::new(Direction::Backward, &config).patch_array(items, changes, Some(&key))
    }

    fn array(json: serde_json::Value) -> Vec<Value> {
        match v(json) {
            Value::Array(items) => items,
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn tail_removals_are_order_independent() {
        let changes = vec![
            Change::remove("1", v(json!(2))),
            Change::remove("2", v(json!(3))),
        ];
        let mut items = array(json!([1, 2, 3]));
        forward(&mut items, &changes, EmbeddedKey::Index).unwrap();
        assert_eq!(items, array(json!([1])));

        backward(&mut items, &changes, EmbeddedKey::Index).unwrap();
        assert_eq!(items, array(json!([1, 2, 3])));
    }

    #[test]
    fn remove_add_pair_replaces_in_place() {
        let changes = vec![
            Change::remove("1", v(json!("a"))),
            Change::add("1", v(json!(2))),
        ];
        let mut items = array(json!([1, "a", 3]));
        forward(&mut items, &changes, EmbeddedKey::Index).unwrap();
        assert_eq!(items, array(json!([1, 2, 3])));

        backward(&mut items, &changes, EmbeddedKey::Index).unwrap();
        assert_eq!(items, array(json!([1, "a", 3])));
    }

    #[test]
    fn additions_append_in_index_order() {
        let changes = vec![Change::add("1", v(json!("b"))), Change::add("2", v(json!("c")))];
        let mut items = array(json!(["a"]));
        forward(&mut items, &changes, EmbeddedKey::Index).unwrap();
        assert_eq!(items, array(json!(["a", "b", "c"])));

        backward(&mut items, &changes, EmbeddedKey::Index).unwrap();
        assert_eq!(items, array(json!(["a"])));
    }

    #[test]
    fn non_numeric_positional_update_is_rejected() {
        let mut items = array(json!([1]));
        let changes = [Change::update("x", v(json!(2)), v(json!(1)))];
        let err = forward(&mut items, &changes, EmbeddedKey::Index).unwrap_err();
        assert_eq!(err, PatchError::InvalidIndex { key: "x".into() });
    }

    #[test]
    fn addition_without_matching_removal_never_overwrites() {
        let changes = vec![Change::add("0", v(json!(9))), Change::add("7", v(json!(8)))];
        let mut items = array(json!([1, 2]));
        forward(&mut items, &changes, EmbeddedKey::Index).unwrap();
        assert_eq!(items, array(json!([1, 2, 9, 8])));
    }

    #[test]
    fn unaddressed_changes_append_and_delete_by_value() {
        let config = PatchConfig::default();
        let changes = vec![
            Change::add("cy", v(json!({"name": "cy"}))),
            Change::add("3", v(json!(3))),
        ];
        let mut items = array(json!([{"name": "ann"}, 3]));
        Patcher::new(Direction::Forward, &config)
            .patch_array(&mut items, &changes, None)
            .unwrap();
        assert_eq!(items, array(json!([{"name": "ann"}, 3, {"name": "cy"}, 3])));

        Patcher::new(Direction::Backward, &config)
            .patch_array(&mut items, &changes, None)
            .unwrap();
        assert_eq!(items, array(json!([{"name": "ann"}, 3])));
    }

    #[test]
    fn unaddressed_delete_of_absent_value_follows_policy() {
        let changes = vec![Change::remove("x", v(json!("gone")))];
        let mut items = array(json!(["a"]));
        let lenient = PatchConfig::default();
        Patcher::new(Direction::Forward, &lenient)
            .patch_array(&mut items, &changes, None)
            .unwrap();
        assert_eq!(items, array(json!(["a"])));

        let err = Patcher::new(Direction::Forward, &PatchConfig::strict())
            .patch_array(&mut items, &changes, None)
            .unwrap_err();
        assert!(matches!(err, PatchError::MissingElement { ref key, .. } if key == "x"));
    }

    #[test]
    fn keyed_remove_matches_stringified_identity() {
        let mut items = array(json!([{"id": 1}, {"id": 2}]));
        let changes = vec![Change::remove("2", v(json!({"id": 2})))];
        forward(&mut items, &changes, EmbeddedKey::Field("id".into())).unwrap();
        assert_eq!(items, array(json!([{"id": 1}])));
    }

    #[test]
    fn keyed_missing_element_is_skipped_by_default() {
        let mut items = array(json!([{"id": 1}]));
        let changes = vec![
            Change::remove("9", v(json!({"id": 9}))),
            Change::add("3", v(json!({"id": 3}))),
        ];
        forward(&mut items, &changes, EmbeddedKey::Field("id".into())).unwrap();
        assert_eq!(items, array(json!([{"id": 1}, {"id": 3}])));
    }

    #[test]
    fn keyed_missing_element_fails_when_strict() {
        let config = PatchConfig {
            on_missing: MissingPolicy::Fail,
        };
        let mut items = array(json!([{"id": 1}]));
        let changes = vec![Change::remove("9", v(json!({"id": 9})))];
        let err = Patcher::new(Direction::Forward, &config)
            .patch_array(&mut items, &changes, Some(&EmbeddedKey::Field("id".into())))
            .unwrap_err();
        assert!(matches!(err, PatchError::MissingElement { .. }));
    }

    #[test]
    fn keyed_branch_descends_into_matching_element() {
        let mut items = array(json!([{"id": "a", "n": 1}, {"id": "b", "n": 1}]));
        let changes = vec![Change::branch(
            "b",
            vec![Change::update("n", v(json!(2)), v(json!(1)))],
        )];
        forward(&mut items, &changes, EmbeddedKey::Field("id".into())).unwrap();
        assert_eq!(items, array(json!([{"id": "a", "n": 1}, {"id": "b", "n": 2}])));
    }

    #[test]
    fn element_identity_renders_missing_field_as_undefined() {
        assert_eq!(element_identity(&v(json!({"x": 1})), "id"), "undefined");
        assert_eq!(element_identity(&v(json!({"id": true})), "id"), "true");
    }
}
