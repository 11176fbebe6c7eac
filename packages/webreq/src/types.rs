use std::collections::hash_map;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Well-known request methods.
///
/// Any non-empty method string is accepted by a [`Request`](crate::Request);
/// these are conveniences.
pub mod method {
    pub const GET: &str = "GET";
    pub const POST: &str = "POST";
}

/// Outgoing request headers.
///
/// Keys and values are never empty: empty entries are dropped on
/// construction and ignored by [`HeaderSet::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "HashMap<String, String>")]
pub struct HeaderSet {
    entries: HashMap<String, String>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `map`, dropping any entry with an empty key or value.
    pub fn from_map(mut map: HashMap<String, String>) -> Self {
        map.retain(|k, v| !k.is_empty() && !v.is_empty());
        Self { entries: map }
    }

    /// Insert `key: value`, replacing an earlier value for the same key.
    ///
    /// Does nothing when either side is empty.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if key.is_empty() || value.is_empty() {
            return;
        }
        self.entries.insert(key, value);
    }

    /// Chaining form of [`HeaderSet::add`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.entries.iter()
    }
}

impl From<HashMap<String, String>> for HeaderSet {
    fn from(map: HashMap<String, String>) -> Self {
        Self::from_map(map)
    }
}

impl From<HeaderSet> for HashMap<String, String> {
    fn from(headers: HeaderSet) -> Self {
        headers.entries
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (k, v) in iter {
            headers.add(k, v);
        }
        headers
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
