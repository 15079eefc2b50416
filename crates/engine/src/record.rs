//! The stored record type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored record: a JSON object mapping field names to values.
///
/// The connector stores each value as a single-field record under its
/// configured value field, mirroring the key-path/value-path layout of the
/// backing store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record holding a single field.
    pub fn single(field: impl Into<String>, value: Value) -> Self {
        let mut map = Map::with_capacity(1);
        map.insert(field.into(), value);
        Self(map)
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Extract a field by name, consuming the record.
    pub fn into_field(mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Insert a field, returning the previous value if any.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }
}
