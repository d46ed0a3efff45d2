//! Changeset reverter: move a value backward in time.
//!
//! Additions are reverted by removal, removals by re-inserting the captured
//! value, and updates by writing the prior value. Changes are visited last
//! to first so that a removal-then-addition pair at one key unwinds in the
//! right order.

use jdelta_types::{Change, Value};

use crate::config::PatchConfig;
use crate::engine::{Direction, Patcher};
use crate::error::PatchResult;

/// Revert `changes` on `target` in place with the default configuration.
///
/// # Errors
///
/// See [`revert_with`].
pub fn revert(target: &mut Value, changes: &[Change]) -> PatchResult<()> {
    revert_with(target, changes, &PatchConfig::default())
}

/// Revert `changes` on `target` in place.
///
/// # Errors
///
/// The same conditions as [`apply_with`](crate::apply_with).
pub fn revert_with(target: &mut Value, changes: &[Change], config: &PatchConfig) -> PatchResult<()> {
    Patcher::new(Direction::Backward, config).run(target, changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;
    use crate::config::PatchConfig;
    use crate::error::PatchError;
    use jdelta_diff::{diff, IdentityRules};
    use jdelta_types::EmbeddedKey;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn roundtrip(old: serde_json::Value, new: serde_json::Value, rules: &IdentityRules) {
        let (old, new) = (v(old), v(new));
        let changes = diff(&old, &new, rules);
        let mut target = new.clone();
        revert(&mut target, &changes).unwrap();
        assert_eq!(target, old);

        apply(&mut target, &changes).unwrap();
        assert_eq!(target, new);
    }

    #[test]
    fn reverts_object_changes() {
        roundtrip(
            json!({"name": "a", "gone": true, "cfg": {"port": 80}}),
            json!({"name": "b", "cfg": {"port": 81, "tls": true}}),
            &IdentityRules::new(),
        );
    }

    #[test]
    fn reverts_type_change_at_key() {
        roundtrip(json!({"a": 1}), json!({"a": "x"}), &IdentityRules::new());
    }

    #[test]
    fn reverts_root_changes() {
        roundtrip(json!(1), json!(2), &IdentityRules::new());
        roundtrip(json!("s"), json!({"k": [1]}), &IdentityRules::new());
        roundtrip(json!([1, 2, 3]), json!([3]), &IdentityRules::new());
    }

    #[test]
    fn reverts_positional_tail_changes() {
        roundtrip(json!({"xs": [1, 2, 3, 4]}), json!({"xs": [1]}), &IdentityRules::new());
        roundtrip(json!({"xs": [1]}), json!({"xs": [1, 2, 3, 4]}), &IdentityRules::new());
    }

    #[test]
    fn reverts_keyed_changes() {
        let rules = IdentityRules::new().field("items", "id");
        roundtrip(
            json!({"items": [{"id": 1, "q": 1}, {"id": 2, "q": 1}]}),
            json!({"items": [{"id": 1, "q": 5}, {"id": 3, "q": 1}]}),
            &rules,
        );
    }

    #[test]
    fn missing_keyed_element_is_non_fatal() {
        let rules = IdentityRules::new().field("items", "id");
        let old = v(json!({"items": [{"id": 1}], "n": 1}));
        let new = v(json!({"items": [{"id": 1}, {"id": 2}], "n": 2}));
        let changes = diff(&old, &new, &rules);

        // The element the changeset added is already gone from the target.
        let mut target = v(json!({"items": [{"id": 1}], "n": 2}));
        revert(&mut target, &changes).unwrap();
        assert_eq!(target, old);
    }

    #[test]
    fn missing_keyed_element_fails_when_strict() {
        let changes = vec![Change::array_branch(
            "items",
            EmbeddedKey::Field("id".into()),
            vec![Change::add("2", v(json!({"id": 2})))],
        )];
        let mut target = v(json!({"items": [{"id": 1}]}));
        let err = revert_with(&mut target, &changes, &PatchConfig::strict()).unwrap_err();
        assert_eq!(
            err,
            PatchError::MissingElement {
                embedded_key: "id".into(),
                key: "2".into()
            }
        );
    }
}
