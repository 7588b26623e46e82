//! Property collections
//!
//! [`PropertySet`] is the ordered bag a loaded definition exposes. Names are
//! matched case-insensitively, like the build engine does; setting an existing
//! name rewrites it in place while a new name is appended. A [`Watermark`]
//! taken before execution splits the set into "was already there" and "was
//! introduced by the build", which is all the harvester needs.
//!
//! [`GlobalPropertyTable`] is the long-lived table handed to the main build.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Number of entries a [`PropertySet`] held when it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct Watermark(pub usize);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertySet {
    entries: Vec<Property>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, keeping the original position of an existing entry.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(index) => self.entries[index].value = value.to_string(),
            None => self.entries.push(Property::new(name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.entries.iter()
    }

    pub fn watermark(&self) -> Watermark {
        Watermark(self.entries.len())
    }

    /// Entries appended after `mark` was taken. Entries that existed before and
    /// were only rewritten are not included.
    pub fn appended_since(&self, mark: Watermark) -> &[Property] {
        let start = mark.0.min(self.entries.len());
        &self.entries[start..]
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut set = PropertySet::new();
        for (name, value) in iter {
            set.set(name, value);
        }
        set
    }
}

/// Global properties consulted by every project of the main build.
///
/// Lives as long as the hosting process. Entries are added or overwritten,
/// never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalPropertyTable {
    entries: BTreeMap<String, String>,
}

impl GlobalPropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a global property, replacing any entry whose name differs only by case.
    pub fn set(&mut self, name: &str, value: &str) -> Option<String> {
        let existing = self
            .entries
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned();

        let previous = existing.and_then(|k| self.entries.remove(&k));
        self.entries.insert(name.to_string(), value.to_string());
        previous
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
