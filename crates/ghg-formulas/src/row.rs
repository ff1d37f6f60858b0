//! Worksheet rows.
//!
//! A row is decoded twice: once as the raw JSON object (so it can be echoed
//! verbatim) and once into the category's typed view.

use std::ops::Deref;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct InputRow<T> {
    raw: Map<String, Value>,
    fields: T,
}

impl<T> InputRow<T> {
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn fields(&self) -> &T {
        &self.fields
    }

    /// Pass the row through to the output untouched.
    pub fn echo<C>(&self) -> RowOutcome<C> {
        RowOutcome::Echoed(self.raw.clone())
    }
}

impl<T: DeserializeOwned> InputRow<T> {
    pub fn from_map(raw: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let fields = T::deserialize(Value::Object(raw.clone()))?;
        Ok(Self { raw, fields })
    }
}

impl<T> Deref for InputRow<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.fields
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for InputRow<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        InputRow::from_map(raw).map_err(de::Error::custom)
    }
}

impl<T> Serialize for InputRow<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// A worksheet table. `null` and a missing key both read as empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Rows<T>(Vec<InputRow<T>>);

impl<T> Default for Rows<T> {
    fn default() -> Self {
        Rows(Vec::new())
    }
}

impl<T> Rows<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, InputRow<T>> {
        self.0.iter()
    }
}

impl<T> Deref for Rows<T> {
    type Target = [InputRow<T>];

    fn deref(&self) -> &[InputRow<T>] {
        &self.0
    }
}

impl<'a, T> IntoIterator for &'a Rows<T> {
    type Item = &'a InputRow<T>;
    type IntoIter = std::slice::Iter<'a, InputRow<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T> FromIterator<InputRow<T>> for Rows<T> {
    fn from_iter<I: IntoIterator<Item = InputRow<T>>>(iter: I) -> Self {
        Rows(iter.into_iter().collect())
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Rows<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Option::<Vec<InputRow<T>>>::deserialize(deserializer)?;
        Ok(Rows(rows.unwrap_or_default()))
    }
}

impl<T> Serialize for Rows<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// A per-row output entry: either the input echoed unchanged, or the
/// category's computed row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowOutcome<C> {
    Echoed(Map<String, Value>),
    Computed(C),
}

impl<C> RowOutcome<C> {
    pub fn computed(&self) -> Option<&C> {
        match self {
            RowOutcome::Computed(row) => Some(row),
            RowOutcome::Echoed(_) => None,
        }
    }

    pub fn is_echoed(&self) -> bool {
        matches!(self, RowOutcome::Echoed(_))
    }
}
