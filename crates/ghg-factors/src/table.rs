use std::collections::BTreeMap;

use ghg_common::GhgError;
use serde::{Deserialize, Serialize};

/// Read-only factor lookup keyed by category name.
///
/// Entries are kept sorted so iteration order never depends on how the source
/// document happened to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorTable<V> {
    entries: BTreeMap<String, V>,
}

impl<V> Default for FactorTable<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> FactorTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Look up `key`, failing with `MissingKey` naming `table`.
    pub fn require(&self, table: &'static str, key: &str) -> Result<&V, GhgError> {
        self.entries
            .get(key)
            .ok_or_else(|| GhgError::missing(table, key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for FactorTable<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
