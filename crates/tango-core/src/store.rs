//! The loaded vocabulary, swapped wholesale on every source load.
//!
//! Readers take an `Arc<Snapshot>` and sample from it without holding the
//! lock, so a concurrent `replace` never exposes a half-built list. Each
//! snapshot carries a generation number that prefetch workers use to
//! discard picks from a source that is no longer active.

use std::sync::{Arc, PoisonError, RwLock};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::entry::Entry;
use crate::CoreError;

/// An immutable view of the store at one generation.
pub struct Snapshot {
    generation: u64,
    entries: Vec<Entry>,
}

impl Snapshot {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uniform random pick over the whole snapshot.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Entry, CoreError> {
        self.entries
            .choose(rng)
            .cloned()
            .ok_or(CoreError::EmptyStore)
    }
}

pub struct EntryStore {
    current: RwLock<Arc<Snapshot>>,
}

impl Default for EntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot {
                generation: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Replace the whole list, dropping entries with neither word nor reading.
    /// Returns the generation of the new snapshot.
    pub fn replace(&self, entries: Vec<Entry>) -> u64 {
        let total = entries.len();
        let entries: Vec<Entry> = entries.into_iter().filter(Entry::is_valid).collect();
        let dropped = total - entries.len();

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let generation = current.generation + 1;
        debug!(generation, kept = entries.len(), dropped, "entry store replaced");
        *current = Arc::new(Snapshot {
            generation,
            entries,
        });
        generation
    }

    /// Empty the store ahead of a reload. Bumps the generation like `replace`.
    pub fn clear(&self) -> u64 {
        self.replace(Vec::new())
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    pub fn sample(&self) -> Result<Entry, CoreError> {
        self.sample_with(&mut rand::thread_rng())
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Entry, CoreError> {
        self.snapshot().sample_with(rng)
    }

    pub fn size(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }
}
