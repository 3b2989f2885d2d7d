//! Entries the user marked for revision.
//!
//! Insertion order is kept for display; membership is by value and the list
//! never holds duplicates or invalid entries.

mod persistence;

#[cfg(test)]
mod tests;

pub use persistence::{
    decode, encode, load, load_existing, save, tmp_path, JsonFileStore, MemoryStore,
    PersistError, PersistedState, RevisionStore, DEFAULT_FILE_NAME,
};

use crate::entry::Entry;
use crate::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionList {
    entries: Vec<Entry>,
}

impl RevisionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted entries, skipping invalid ones and repeats.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut list = Self::new();
        for entry in entries {
            let _ = list.add(entry);
        }
        list
    }

    /// Append `entry` unless an equal one is already present.
    /// Returns `Ok(true)` if the list changed.
    pub fn add(&mut self, entry: Entry) -> Result<bool, CoreError> {
        if !entry.is_valid() {
            return Err(CoreError::InvalidEntry);
        }
        if self.contains(&entry) {
            return Ok(false);
        }
        self.entries.push(entry);
        Ok(true)
    }

    /// Remove every entry equal to `entry`. Returns `true` if any was removed.
    pub fn remove(&mut self, entry: &Entry) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e != entry);
        self.entries.len() < before
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.entries.contains(entry)
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Owned copy of the list, in insertion order.
    pub fn all(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RevisionList {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
