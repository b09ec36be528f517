//! Data collected over the course of a conversation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field name → value, as produced by the external extractor.
pub type DataMap = BTreeMap<String, Value>;

/// Accumulated conversation data.
///
/// Grows monotonically: keys are added or overwritten, never removed,
/// except when the whole conversation is reset. Null values carry no
/// information and are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectedData(DataMap);

impl CollectedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True if `key` holds a meaningful value (not null, not an empty string).
    pub fn has(&self, key: &str) -> bool {
        self.0.get(key).map(is_meaningful).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &DataMap {
        &self.0
    }

    /// The subset of `incoming` that would add or change a stored value.
    pub fn changes_from(&self, incoming: &DataMap) -> DataMap {
        incoming
            .iter()
            .filter(|(_, value)| !value.is_null())
            .filter(|(key, value)| self.0.get(key.as_str()) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Merges `updates`, skipping nulls. Returns the keys that changed.
    pub(crate) fn merge(&mut self, updates: DataMap) -> Vec<String> {
        let mut changed = Vec::new();
        for (key, value) in updates {
            if value.is_null() || self.0.get(&key) == Some(&value) {
                continue;
            }
            changed.push(key.clone());
            self.0.insert(key, value);
        }
        changed
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

impl From<DataMap> for CollectedData {
    fn from(map: DataMap) -> Self {
        Self(map.into_iter().filter(|(_, v)| !v.is_null()).collect())
    }
}

fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}
