//! Word supply for the drill engine.
//!
//! `EntryStore` holds the loaded vocabulary, `PrefetchBuffer` keeps a few
//! random picks ready for the consumer, and `RevisionList` is the persisted
//! set of entries the user marked for revision.

pub mod entry;
pub mod prefetch;
pub mod revisions;
pub mod settings;
pub mod source;
pub mod store;
pub mod unicode;

use std::io;

pub use entry::Entry;
pub use prefetch::PrefetchBuffer;
pub use revisions::{PersistedState, RevisionList, RevisionStore};
pub use source::{SourceError, SourceId, WordSource};
pub use store::EntryStore;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("entry store is empty")]
    EmptyStore,

    #[error("entry has neither word nor reading")]
    InvalidEntry,

    #[error("prefetch capacity must be positive")]
    InvalidCapacity,

    #[error("unknown word source: {0}")]
    UnknownSource(String),

    #[error("failed to spawn prefetch worker: {0}")]
    Spawn(#[source] io::Error),
}
