use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ImportError;

/// Reserved key naming the importer for a row
pub const MODEL_KEY: &str = "@model";

/// One record of import data
///
/// A flat JSON object. Before resolution it carries the reserved
/// [`MODEL_KEY`]; after resolution the remaining fields are the importer's
/// settings. Field order is preserved as written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Importer identifier named by this row, if it is a string
    pub fn model(&self) -> Option<&str> {
        self.0.get(MODEL_KEY).and_then(Value::as_str)
    }

    /// Remove and return the reserved importer key
    pub fn take_model(&mut self) -> Option<Value> {
        self.0.remove(MODEL_KEY)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of a field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Field value rendered as an identifier (strings verbatim, numbers as text)
    pub fn get_id(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Row {
    type Error = ImportError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ImportError::MalformedRow {
                found: json_type_name(&other).to_string(),
            }),
        }
    }
}

/// Short JSON type name used in error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
