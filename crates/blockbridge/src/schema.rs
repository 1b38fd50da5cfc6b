//! Context allow-listing and attribute validation.
//!
//! Every function here is total: malformed input is coerced to a type-appropriate
//! value, never rejected. The same functions are used for native and bridged
//! renders so identical input always validates to identical output.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use smol_str::SmolStr;

use crate::ValueMap;

/// Leading numeric prefix of a string, e.g. `12` in `"12px"`.
static NUMERIC_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("static regex")
});

/// Attribute schema of a block type, keyed by attribute name.
pub type AttributeSchema = BTreeMap<String, AttributeDefinition>;

/// Declared type of a block attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SmolStr", into = "SmolStr")]
pub enum AttributeType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    /// Anything else. Values of unknown types are passed through untouched.
    Unknown(SmolStr),
}

impl Default for AttributeType {
    fn default() -> Self {
        AttributeType::Unknown(SmolStr::default())
    }
}

impl From<SmolStr> for AttributeType {
    fn from(name: SmolStr) -> Self {
        match name.as_str() {
            "string" => AttributeType::String,
            "number" => AttributeType::Number,
            "integer" => AttributeType::Integer,
            "boolean" => AttributeType::Boolean,
            "array" => AttributeType::Array,
            "object" => AttributeType::Object,
            _ => AttributeType::Unknown(name),
        }
    }
}

impl From<&str> for AttributeType {
    fn from(name: &str) -> Self {
        SmolStr::new(name).into()
    }
}

impl From<AttributeType> for SmolStr {
    fn from(ty: AttributeType) -> Self {
        match ty {
            AttributeType::String => SmolStr::new_static("string"),
            AttributeType::Number => SmolStr::new_static("number"),
            AttributeType::Integer => SmolStr::new_static("integer"),
            AttributeType::Boolean => SmolStr::new_static("boolean"),
            AttributeType::Array => SmolStr::new_static("array"),
            AttributeType::Object => SmolStr::new_static("object"),
            AttributeType::Unknown(name) => name,
        }
    }
}

/// One entry of an attribute schema.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    #[serde(rename = "type", default)]
    pub declared_type: AttributeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl AttributeDefinition {
    pub fn new(declared_type: impl Into<AttributeType>) -> Self {
        Self {
            declared_type: declared_type.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Keep only the context keys a block declared it consumes.
///
/// This is an allow-list: with no accepted keys the result is always empty.
pub fn filter_context<S: AsRef<str>>(accepted_keys: &[S], raw: &ValueMap) -> ValueMap {
    accepted_keys
        .iter()
        .filter_map(|key| {
            let key = key.as_ref();
            raw.get(key).map(|value| (key.to_owned(), value.clone()))
        })
        .collect()
}

/// Validate raw attributes against a schema.
///
/// Supplied values are cast to their declared type, missing values fall back to the
/// schema default, and keys with neither are left out. Undeclared keys are dropped.
pub fn apply_defaults_and_cast(schema: &AttributeSchema, raw: &ValueMap) -> ValueMap {
    let mut validated = ValueMap::new();
    for (name, definition) in schema {
        if let Some(value) = raw.get(name) {
            validated.insert(name.clone(), cast(value, &definition.declared_type));
        } else if let Some(default) = &definition.default {
            validated.insert(name.clone(), default.clone());
        }
    }
    validated
}

/// Cast a value to a declared attribute type.
pub fn cast(value: &Value, declared_type: &AttributeType) -> Value {
    match declared_type {
        AttributeType::String => Value::String(to_text(value)),
        AttributeType::Number => Value::Number(to_number(value).unwrap_or_else(|| 0.into())),
        AttributeType::Integer => Value::Number(to_integer(value).into()),
        AttributeType::Boolean => Value::Bool(is_truthy(value)),
        AttributeType::Array => match value {
            Value::Array(_) => value.clone(),
            _ => Value::Array(Vec::new()),
        },
        AttributeType::Object => match value {
            Value::Object(_) => value.clone(),
            Value::Array(items) => Value::Object(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), item.clone()))
                    .collect(),
            ),
            _ => Value::Object(ValueMap::new()),
        },
        AttributeType::Unknown(_) => value.clone(),
    }
}

/// Truthiness: `null`, `false`, zero, `""`, `"0"` and empty collections are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Textual form of a value. Strings are returned as-is, collections as compact JSON.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// The value as a number, if it is a number or a string that is entirely numeric.
fn to_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(int) = s.parse::<i64>() {
                Some(int.into())
            } else if NUMERIC_PREFIX_RE
                .find(s)
                .is_some_and(|m| m.end() == s.len())
            {
                s.parse::<f64>().ok().and_then(Number::from_f64)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn to_integer(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => NUMERIC_PREFIX_RE
            .find(s.trim_start())
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|f| f.trunc() as i64)
            .unwrap_or(0),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(map) => i64::from(!map.is_empty()),
    }
}
