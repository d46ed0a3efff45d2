//! Change nodes: the nested form of a changeset.
//!
//! A [`Change`] is either a leaf, carrying the added/removed/updated value,
//! or a branch, carrying the ordered changes of a container. Branches over
//! arrays additionally record the [`EmbeddedKey`] their elements were
//! matched by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TypeError, TypeResult};
use crate::value::Value;

/// Key of a node that addresses the diffed value itself.
pub const ROOT_KEY: &str = "$root";

/// Serialized spelling of [`EmbeddedKey::Index`].
pub const INDEX_KEY: &str = "$index";

/// An ordered sequence of root-level change nodes.
pub type Changeset = Vec<Change>;

/// The closed set of change operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Add,
    Remove,
    Update,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Add => "ADD",
            ChangeKind::Remove => "REMOVE",
            ChangeKind::Update => "UPDATE",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = TypeError;

    fn from_str(s: &str) -> TypeResult<Self> {
        match s {
            "ADD" => Ok(ChangeKind::Add),
            "REMOVE" => Ok(ChangeKind::Remove),
            "UPDATE" => Ok(ChangeKind::Update),
            other => Err(TypeError::UnknownOperation(other.to_string())),
        }
    }
}

/// How the elements of an array branch were matched across versions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EmbeddedKey {
    /// Elements are addressed by position.
    Index,
    /// Elements are addressed by the value of this field.
    Field(String),
}

impl EmbeddedKey {
    /// Parse the serialized spelling: `$index` or a field name.
    pub fn from_name(name: &str) -> Self {
        if name == INDEX_KEY {
            EmbeddedKey::Index
        } else {
            EmbeddedKey::Field(name.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EmbeddedKey::Index => INDEX_KEY,
            EmbeddedKey::Field(name) => name,
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, EmbeddedKey::Index)
    }
}

impl fmt::Display for EmbeddedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EmbeddedKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EmbeddedKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(EmbeddedKey::from_name(&name))
    }
}

/// A node of the change tree.
///
/// Leaves carry `value` (and `old_value` for updates); branches carry
/// `changes`. [`Change::validate`] checks that a node is one or the other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_key: Option<EmbeddedKey>,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<Change>>,
}

/// A member that is present in the input is a value, even when it is `null`.
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Change {
    fn leaf(kind: ChangeKind, key: impl Into<String>, value: Value, old_value: Option<Value>) -> Self {
        Self {
            kind,
            key: key.into(),
            embedded_key: None,
            value: Some(value),
            old_value,
            changes: None,
        }
    }

    /// Leaf: `value` was inserted at `key`.
    pub fn add(key: impl Into<String>, value: Value) -> Self {
        Self::leaf(ChangeKind::Add, key, value, None)
    }

    /// Leaf: `value` was deleted from `key`.
    pub fn remove(key: impl Into<String>, value: Value) -> Self {
        Self::leaf(ChangeKind::Remove, key, value, None)
    }

    /// Leaf: the scalar at `key` changed from `old_value` to `value`.
    pub fn update(key: impl Into<String>, value: Value, old_value: Value) -> Self {
        Self::leaf(ChangeKind::Update, key, value, Some(old_value))
    }

    /// Branch over an object member.
    pub fn branch(key: impl Into<String>, changes: Vec<Change>) -> Self {
        Self {
            kind: ChangeKind::Update,
            key: key.into(),
            embedded_key: None,
            value: None,
            old_value: None,
            changes: Some(changes),
        }
    }

    /// Branch over an array whose elements were matched by `embedded_key`.
    pub fn array_branch(key: impl Into<String>, embedded_key: EmbeddedKey, changes: Vec<Change>) -> Self {
        Self {
            embedded_key: Some(embedded_key),
            ..Self::branch(key, changes)
        }
    }

    pub fn is_branch(&self) -> bool {
        self.changes.is_some()
    }

    pub fn is_leaf(&self) -> bool {
        self.changes.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.key == ROOT_KEY
    }

    /// Child nodes; empty for leaves.
    pub fn children(&self) -> &[Change] {
        self.changes.as_deref().unwrap_or(&[])
    }

    /// Check this node's own shape. Children are not visited.
    ///
    /// # Errors
    ///
    /// `MalformedChange` when a branch carries values or is not an update,
    /// when a leaf lacks its value, when an update leaf lacks its prior
    /// value, or when an add/remove leaf carries one.
    pub fn validate(&self) -> TypeResult<()> {
        let malformed = |reason: &str| TypeError::MalformedChange {
            key: self.key.clone(),
            reason: reason.to_string(),
        };
        if self.is_branch() {
            if self.value.is_some() || self.old_value.is_some() {
                return Err(malformed("branch carries both child changes and a value"));
            }
            if self.kind != ChangeKind::Update {
                return Err(malformed("branch change must be an UPDATE"));
            }
            return Ok(());
        }
        if self.embedded_key.is_some() {
            return Err(malformed("leaf change carries an embedded key"));
        }
        if self.value.is_none() {
            return Err(malformed("leaf change carries no value"));
        }
        match self.kind {
            ChangeKind::Update if self.old_value.is_none() => {
                Err(malformed("UPDATE leaf carries no prior value"))
            }
            ChangeKind::Add | ChangeKind::Remove if self.old_value.is_some() => {
                Err(malformed("ADD/REMOVE leaf carries a prior value"))
            }
            _ => Ok(()),
        }
    }

    /// Validate this node and every descendant.
    pub fn validate_tree(&self) -> TypeResult<()> {
        self.validate()?;
        self.children().iter().try_for_each(Change::validate_tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_parses_closed_set() {
        assert_eq!("ADD".parse::<ChangeKind>().unwrap(), ChangeKind::Add);
        assert_eq!("REMOVE".parse::<ChangeKind>().unwrap(), ChangeKind::Remove);
        assert_eq!("UPDATE".parse::<ChangeKind>().unwrap(), ChangeKind::Update);
        assert_eq!(
            "MOVE".parse::<ChangeKind>(),
            Err(TypeError::UnknownOperation("MOVE".into()))
        );
    }

    #[test]
    fn unknown_kind_fails_deserialization() {
        let raw = json!({"type": "RENAME", "key": "a", "value": 1});
        assert!(serde_json::from_value::<Change>(raw).is_err());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let change = Change::array_branch(
            "items",
            EmbeddedKey::Field("id".into()),
            vec![Change::update("n", Value::from("b"), Value::from("a"))],
        );
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "UPDATE",
                "key": "items",
                "embeddedKey": "id",
                "changes": [{"type": "UPDATE", "key": "n", "value": "b", "oldValue": "a"}]
            })
        );
    }

    #[test]
    fn null_value_survives_deserialization() {
        let raw = json!({"type": "UPDATE", "key": "a", "value": 1, "oldValue": null});
        let change: Change = serde_json::from_value(raw).unwrap();
        assert_eq!(change.old_value, Some(Value::Null));
        assert!(change.validate().is_ok());
    }

    #[test]
    fn index_embedded_key_uses_sentinel_spelling() {
        let change = Change::array_branch("xs", EmbeddedKey::Index, vec![]);
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["embeddedKey"], json!("$index"));
        let back: Change = serde_json::from_value(json).unwrap();
        assert_eq!(back.embedded_key, Some(EmbeddedKey::Index));
    }

    #[test]
    fn validate_rejects_update_without_old_value() {
        let mut change = Change::update("a", Value::from(2i64), Value::from(1i64));
        change.old_value = None;
        assert!(matches!(
            change.validate(),
            Err(TypeError::MalformedChange { .. })
        ));
    }

    #[test]
    fn validate_rejects_branch_with_value() {
        let mut change = Change::branch("a", vec![]);
        change.value = Some(Value::Null);
        assert!(change.validate().is_err());
    }

    #[test]
    fn validate_tree_reaches_descendants() {
        let mut bad = Change::add("b", Value::from(1i64));
        bad.value = None;
        let tree = Change::branch("a", vec![bad]);
        assert!(tree.validate().is_ok());
        assert!(tree.validate_tree().is_err());
    }
}
