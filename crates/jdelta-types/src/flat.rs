//! Flat change entries: leaf changes addressed by a path string.

use serde::{Deserialize, Deserializer, Serialize};

use crate::change::{Change, ChangeKind};
use crate::classify::ValueType;
use crate::value::Value;

/// A single leaf change, addressed by a `$`-rooted path into the original
/// value instead of by its position in a change tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub key: String,
    pub path: String,
    pub value_type: ValueType,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub value: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub old_value: Option<Value>,
}

fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl FlatChange {
    /// Build an entry for a leaf change at `path`.
    ///
    /// The value type is classified from `value`, which for removals is the
    /// removed value.
    pub fn from_leaf(change: &Change, path: impl Into<String>) -> Self {
        let value_type = change
            .value
            .as_ref()
            .map(Value::value_type)
            .unwrap_or(ValueType::Undefined);
        Self {
            kind: change.kind,
            key: change.key.clone(),
            path: path.into(),
            value_type,
            value: change.value.clone(),
            old_value: change.old_value.clone(),
        }
    }

    /// The equivalent leaf node, detached from its path.
    pub fn to_leaf(&self) -> Change {
        self.leaf_at(self.key.clone())
    }

    /// The equivalent leaf node under a different key.
    pub fn leaf_at(&self, key: impl Into<String>) -> Change {
        Change {
            kind: self.kind,
            key: key.into(),
            embedded_key: None,
            value: self.value.clone(),
            old_value: self.old_value.clone(),
            changes: None,
        }
    }

    /// Whether the entry's value is a non-null object.
    pub fn is_object_valued(&self) -> bool {
        self.value_type == ValueType::Object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_removed_value() {
        let change = Change::remove("cfg", Value::from(json!({"debug": true})));
        let flat = FlatChange::from_leaf(&change, "$");
        assert_eq!(flat.value_type, ValueType::Object);
        assert!(flat.is_object_valued());
        assert_eq!(flat.to_leaf(), change);
    }

    #[test]
    fn wire_shape() {
        let change = Change::update("age", Value::from(31i64), Value::from(30i64));
        let flat = FlatChange::from_leaf(&change, "$.age");
        assert_eq!(
            serde_json::to_value(&flat).unwrap(),
            json!({
                "type": "UPDATE",
                "key": "age",
                "path": "$.age",
                "valueType": "Number",
                "value": 31,
                "oldValue": 30
            })
        );
    }
}
