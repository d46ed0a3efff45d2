//! Type classifier: the semantic kind of a [`Value`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Semantic kind of a value.
///
/// The comparator only recurses when both sides share a kind; a kind change
/// is always modelled as a removal followed by an addition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    #[serde(rename = "undefined")]
    Undefined,
    #[serde(rename = "null")]
    Null,
    Object,
    Array,
    Date,
    Function,
    Boolean,
    Number,
    String,
}

impl ValueType {
    /// The tag spelling used in flat change entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Undefined => "undefined",
            ValueType::Null => "null",
            ValueType::Object => "Object",
            ValueType::Array => "Array",
            ValueType::Date => "Date",
            ValueType::Function => "Function",
            ValueType::Boolean => "Boolean",
            ValueType::Number => "Number",
            ValueType::String => "String",
        }
    }

    /// Returns `true` for the three scalar kinds.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            ValueType::Boolean | ValueType::Number | ValueType::String
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a value. Total over [`Value`]; never fails.
pub fn classify(value: &Value) -> ValueType {
    match value {
        Value::Undefined => ValueType::Undefined,
        Value::Null => ValueType::Null,
        Value::Bool(_) => ValueType::Boolean,
        Value::Number(_) => ValueType::Number,
        Value::String(_) => ValueType::String,
        Value::Date(_) => ValueType::Date,
        Value::Array(_) => ValueType::Array,
        Value::Object(_) => ValueType::Object,
        Value::Function(_) => ValueType::Function,
    }
}
