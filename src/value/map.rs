//! An insertion-ordered string-keyed map with unique keys, used for every
//! PackStream `Map` and every graph entity's property bag. A plain
//! `HashMap` would not preserve the order values are displayed/round-tripped
//! in, so we keep parallel storage: an ordered `Vec` of entries plus an
//! index for O(1) lookup by key.

use super::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct OrderedMap {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a key/value pair, preserving the position of the first
    /// insertion if the key already exists (last-write-wins on value).
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(&idx) = self.index.get(&key) {
            self.entries[idx].1 = value;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for OrderedMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl FromIterator<(String, Value)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for OrderedMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let mut m = OrderedMap::new();
        m.insert("b", Value::Integer(2));
        m.insert("a", Value::Integer(1));
        let keys: Vec<&str> = m.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn reinsertion_keeps_position() {
        let mut m = OrderedMap::new();
        m.insert("a", Value::Integer(1));
        m.insert("b", Value::Integer(2));
        m.insert("a", Value::Integer(99));
        let keys: Vec<&str> = m.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(m.get("a"), Some(&Value::Integer(99)));
    }
}
