//! Value comparator: recursive, type-aware comparison of two values.
//!
//! Emission order is part of the contract: for every object (and every
//! array once its elements are keyed) changes to shared keys come first,
//! then additions, then removals.

use indexmap::IndexMap;
use jdelta_types::{classify, Change, Changeset, Map, Value, ROOT_KEY};

use crate::identity::IdentityRules;

/// Keyed members of an object, or of an array after identity indexing.
pub type Members<'v> = IndexMap<String, &'v Value>;

/// Compute the changeset that turns `old` into `new`.
///
/// Arrays are matched by the identity rule for their key path, or by
/// position when no rule matches. Changes at the top level of two objects
/// are returned unwrapped; every other difference at the root is addressed
/// by [`ROOT_KEY`].
pub fn diff(old: &Value, new: &Value, rules: &IdentityRules) -> Changeset {
    let comparator = Comparator { rules };
    comparator.compare(old, new, None, &mut Vec::new())
}

pub(crate) struct Comparator<'r> {
    pub(crate) rules: &'r IdentityRules,
}

impl Comparator<'_> {
    /// Compare two values addressed by `key` (`None` at the root).
    ///
    /// `key_path` holds the object keys leading here and is restored before
    /// returning.
    pub(crate) fn compare(
        &self,
        old: &Value,
        new: &Value,
        key: Option<&str>,
        key_path: &mut Vec<String>,
    ) -> Vec<Change> {
        let node_key = key.unwrap_or(ROOT_KEY);

        if classify(old) != classify(new) {
            return vec![
                Change::remove(node_key, old.clone()),
                Change::add(node_key, new.clone()),
            ];
        }

        match (old, new) {
            (Value::Date(a), Value::Date(b)) => {
                if a.timestamp_millis() == b.timestamp_millis() {
                    Vec::new()
                } else {
                    vec![Change::update(node_key, new.clone(), old.clone())]
                }
            }
            (Value::Object(a), Value::Object(b)) => {
                let diffs = self.compare_objects(a, b, key_path);
                match key {
                    _ if diffs.is_empty() => Vec::new(),
                    Some(_) => vec![Change::branch(node_key, diffs)],
                    None => diffs,
                }
            }
            (Value::Array(a), Value::Array(b)) => self.compare_array(a, b, node_key, key_path),
            (Value::Function(_), Value::Function(_)) => Vec::new(),
            _ => {
                if old == new {
                    Vec::new()
                } else {
                    vec![Change::update(node_key, new.clone(), old.clone())]
                }
            }
        }
    }

    fn compare_objects(&self, old: &Map, new: &Map, key_path: &mut Vec<String>) -> Vec<Change> {
        let old_members: Members<'_> = old.iter().map(|(k, v)| (k.clone(), v)).collect();
        let new_members: Members<'_> = new.iter().map(|(k, v)| (k.clone(), v)).collect();
        self.compare_members(&old_members, &new_members, key_path, true)
    }

    /// Object comparator over keyed members.
    ///
    /// `extend_key_path` is false for array elements: positions and
    /// identities never appear in rule lookup paths.
    pub(crate) fn compare_members(
        &self,
        old: &Members<'_>,
        new: &Members<'_>,
        key_path: &mut Vec<String>,
        extend_key_path: bool,
    ) -> Vec<Change> {
        let mut changes = Vec::new();

        for (key, old_value) in old {
            let Some(new_value) = new.get(key) else {
                continue;
            };
            if extend_key_path {
                key_path.push(key.clone());
            }
            changes.extend(self.compare(old_value, new_value, Some(key.as_str()), key_path));
            if extend_key_path {
                key_path.pop();
            }
        }

        for (key, new_value) in new {
            if !old.contains_key(key) {
                changes.push(Change::add(key.clone(), (*new_value).clone()));
            }
        }

        for (key, old_value) in old {
            if !new.contains_key(key) {
                changes.push(Change::remove(key.clone(), (*old_value).clone()));
            }
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jdelta_types::{ChangeKind, EmbeddedKey};
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn plain(old: serde_json::Value, new: serde_json::Value) -> Changeset {
        diff(&v(old), &v(new), &IdentityRules::new())
    }

    #[test]
    fn identical_values_produce_no_changes() {
        let value = json!({"a": [1, {"b": null}], "c": "x", "d": {"e": true}});
        assert!(plain(value.clone(), value).is_empty());
    }

    #[test]
    fn primitive_root_update() {
        let changes = plain(json!(1), json!(2));
        assert_eq!(changes, vec![Change::update(ROOT_KEY, v(json!(2)), v(json!(1)))]);
    }

    #[test]
    fn type_change_is_remove_then_add() {
        let changes = plain(json!({"a": 1}), json!({"a": "x"}));
        assert_eq!(
            changes,
            vec![
                Change::remove("a", v(json!(1))),
                Change::add("a", v(json!("x"))),
            ]
        );
    }

    #[test]
    fn null_to_value_is_a_type_change() {
        let changes = plain(json!({"a": null}), json!({"a": 0}));
        let kinds: Vec<ChangeKind> = changes.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Remove, ChangeKind::Add]);
    }

    #[test]
    fn emission_order_is_shared_then_added_then_removed() {
        let changes = plain(
            json!({"gone": 1, "kept": 1, "also_gone": 2}),
            json!({"kept": 2, "fresh": 3}),
        );
        let summary: Vec<(ChangeKind, &str)> =
            changes.iter().map(|c| (c.kind, c.key.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (ChangeKind::Update, "kept"),
                (ChangeKind::Add, "fresh"),
                (ChangeKind::Remove, "gone"),
                (ChangeKind::Remove, "also_gone"),
            ]
        );
    }

    #[test]
    fn nested_objects_are_wrapped_in_branches() {
        let changes = plain(
            json!({"cfg": {"net": {"port": 80}}}),
            json!({"cfg": {"net": {"port": 8080}}}),
        );
        assert_eq!(
            changes,
            vec![Change::branch(
                "cfg",
                vec![Change::branch(
                    "net",
                    vec![Change::update("port", v(json!(8080)), v(json!(80)))]
                )]
            )]
        );
    }

    #[test]
    fn dates_compare_by_instant() {
        let a = Value::date_from_millis(1_000).unwrap();
        let b = Value::date_from_millis(2_000).unwrap();
        let mut old = Map::new();
        old.insert("at".into(), a.clone());
        let mut new = Map::new();
        new.insert("at".into(), b.clone());

        let changes = diff(&Value::Object(old.clone()), &Value::Object(new), &IdentityRules::new());
        assert_eq!(changes, vec![Change::update("at", b, a)]);

        let same = diff(&Value::Object(old.clone()), &Value::Object(old), &IdentityRules::new());
        assert!(same.is_empty());
    }

    #[test]
    fn functions_never_differ() {
        let changes = diff(&Value::function("a"), &Value::function("b"), &IdentityRules::new());
        assert!(changes.is_empty());
    }

    #[test]
    fn undefined_member_to_value_is_a_type_change() {
        let mut old = Map::new();
        old.insert("slot".into(), Value::Undefined);
        let new = v(json!({"slot": 1}));
        let changes = diff(&Value::Object(old), &new, &IdentityRules::new());
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0], Change::remove("slot", Value::Undefined));
    }

    #[test]
    fn positional_array_diff() {
        let changes = plain(json!({"xs": [1, 2, 3]}), json!({"xs": [1, 5]}));
        assert_eq!(
            changes,
            vec![Change::array_branch(
                "xs",
                EmbeddedKey::Index,
                vec![
                    Change::update("1", v(json!(5)), v(json!(2))),
                    Change::remove("2", v(json!(3))),
                ]
            )]
        );
    }

    #[test]
    fn root_array_is_addressed_by_root_key() {
        let changes = plain(json!([1]), json!([1, 2]));
        assert_eq!(
            changes,
            vec![Change::array_branch(
                ROOT_KEY,
                EmbeddedKey::Index,
                vec![Change::add("1", v(json!(2)))]
            )]
        );
    }
}
