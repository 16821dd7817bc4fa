//! Per-record field collection

use serde::Serialize;
use std::collections::HashMap;

/// Fields of the record currently being reduced; keys are unique
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Collection {
    fields: HashMap<String, String>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the value it replaced
    pub fn insert(&mut self, key: String, value: String) -> Option<String> {
        self.fields.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Collection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
