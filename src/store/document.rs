//! Schemaless JSON documents keyed by their `uid` field.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Keyed;

/// Field holding the document key
pub const KEY_FIELD: &str = "uid";

/// Key of a [`JsonDocument`]: an integer or a string
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentKey {
    Int(i64),
    Str(String),
}

impl DocumentKey {
    /// Parse a path segment as an integer key
    ///
    /// `0` is a valid key here. A truthiness check on the parsed number
    /// would reject `/items/0` as a bad uid; this parser only rejects text
    /// that is not an integer.
    pub fn parse_integer(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(DocumentKey::Int)
    }

    /// Take a path segment verbatim; empty segments are unusable
    pub fn parse_string(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(DocumentKey::Str(raw.to_string()))
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKey::Int(n) => write!(f, "{}", n),
            DocumentKey::Str(s) => write!(f, "{}", s),
        }
    }
}

/// A JSON object with a mandatory `uid` key field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct JsonDocument {
    key: DocumentKey,
    fields: Map<String, Value>,
}

impl JsonDocument {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field equality against a query value. Query strings also match
    /// numbers and booleans by their text form, so `?a=2` finds `"a": 2`.
    pub fn field_equals(&self, field: &str, query: &Value) -> bool {
        match (self.fields.get(field), query) {
            (None, _) => false,
            (Some(actual), query) if actual == query => true,
            (Some(actual @ (Value::Number(_) | Value::Bool(_))), Value::String(text)) => {
                actual.to_string() == *text
            }
            _ => false,
        }
    }
}

impl Keyed for JsonDocument {
    type Key = DocumentKey;

    fn key(&self) -> DocumentKey {
        self.key.clone()
    }
}

impl TryFrom<Value> for JsonDocument {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(fields) = value else {
            return Err("document must be a JSON object".to_string());
        };
        let raw_key = fields
            .get(KEY_FIELD)
            .ok_or_else(|| format!("document is missing its '{}' field", KEY_FIELD))?;
        let key = DocumentKey::deserialize(raw_key)
            .map_err(|_| format!("'{}' must be an integer or a string", KEY_FIELD))?;
        Ok(Self { key, fields })
    }
}

impl From<JsonDocument> for Value {
    fn from(doc: JsonDocument) -> Self {
        Value::Object(doc.fields)
    }
}
