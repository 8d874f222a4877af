use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Set of tracked account handles.
///
/// Membership is unique and equality ignores order; insertion order is kept
/// only so lists render stably. Serialises as a plain JSON string array,
/// which is the format kept in local storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TrackedAccountSet {
    handles: Vec<String>,
}

impl TrackedAccountSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.handles.iter().any(|h| h == handle)
    }

    /// Returns false if the handle was already present
    pub fn insert(&mut self, handle: impl Into<String>) -> bool {
        let handle = handle.into();
        if self.contains(&handle) {
            return false;
        }
        self.handles.push(handle);
        true
    }

    /// Returns false if the handle was not present
    pub fn remove(&mut self, handle: &str) -> bool {
        let before = self.handles.len();
        self.handles.retain(|h| h != handle);
        self.handles.len() != before
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.handles.iter().map(String::as_str)
    }

    /// Union with another collection of handles; own entries keep their order
    pub fn union<I, S>(&self, other: I) -> TrackedAccountSet
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut merged = self.clone();
        for handle in other {
            merged.insert(handle);
        }
        merged
    }

    /// Handles of this set that `other` lacks
    pub fn missing_from<'a>(&'a self, other: &HashSet<String>) -> Vec<&'a str> {
        self.iter().filter(|h| !other.contains(*h)).collect()
    }
}

impl PartialEq for TrackedAccountSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|h| other.contains(h))
    }
}

impl Eq for TrackedAccountSet {}

impl From<Vec<String>> for TrackedAccountSet {
    fn from(handles: Vec<String>) -> Self {
        let mut set = TrackedAccountSet::new();
        for handle in handles {
            set.insert(handle);
        }
        set
    }
}

impl From<TrackedAccountSet> for Vec<String> {
    fn from(set: TrackedAccountSet) -> Self {
        set.handles
    }
}

impl<S: Into<String>> FromIterator<S> for TrackedAccountSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TrackedAccountSet::new();
        for handle in iter {
            set.insert(handle);
        }
        set
    }
}

/// Remote record of one tracked account (`users/{uid}/trackedAccounts/{username}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntry {
    pub username: String,
    pub added_at: i64,
}
