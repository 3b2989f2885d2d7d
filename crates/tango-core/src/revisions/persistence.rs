use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entry::Entry;
use crate::source::SourceId;

pub const DEFAULT_FILE_NAME: &str = "revisions.json";

/// What survives a restart: the marked entries and the active source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub revisions: Vec<Entry>,
    pub active_source: SourceId,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed revisions document: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk document. Field names are fixed by existing files.
#[derive(Serialize, Deserialize)]
struct RevisionsDocument {
    #[serde(default)]
    revisions: Vec<Entry>,
    #[serde(default)]
    current_source: Option<String>,
}

/// Accepted shapes: the structured document, or the older bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredForm {
    Legacy(Vec<Entry>),
    Document(RevisionsDocument),
}

/// Parse a revisions document. Invalid entries are dropped; an unknown
/// source name falls back to the default source.
pub fn decode(text: &str) -> Result<PersistedState, PersistError> {
    let (revisions, source_name) = match serde_json::from_str::<StoredForm>(text)? {
        StoredForm::Legacy(revisions) => {
            debug!("legacy revisions array, defaulting source");
            (revisions, None)
        }
        StoredForm::Document(doc) => (doc.revisions, doc.current_source),
    };

    let active_source = match source_name {
        Some(name) => name.parse().unwrap_or_else(|_| {
            warn!(source = %name, "unknown source in revisions document, using default");
            SourceId::default()
        }),
        None => SourceId::default(),
    };

    Ok(PersistedState {
        revisions: revisions.into_iter().filter(Entry::is_valid).collect(),
        active_source,
    })
}

pub fn encode(state: &PersistedState) -> Result<String, PersistError> {
    let doc = RevisionsDocument {
        revisions: state.revisions.clone(),
        current_source: Some(state.active_source.to_string()),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Read persisted state. A missing, unreadable or malformed file yields the
/// empty default; this never fails.
pub fn load(path: &Path) -> PersistedState {
    load_existing(path).unwrap_or_default()
}

/// Like `load`, but `None` when there is no usable document. A corrupt file
/// counts as absent.
pub fn load_existing(path: &Path) -> Option<PersistedState> {
    match fs::read_to_string(path) {
        Ok(text) => match decode(&text) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unreadable revisions file");
                None
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no revisions file, starting empty");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read revisions file");
            None
        }
    }
}

/// `<path>.tmp`, next to the target so the rename stays on one filesystem.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Atomic write: write to .tmp then rename.
pub fn save(path: &Path, state: &PersistedState) -> Result<(), PersistError> {
    let text = encode(state)?;
    let tmp = tmp_path(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Storage medium for the revision list.
pub trait RevisionStore: Send {
    fn load(&self) -> PersistedState;
    fn save(&self, state: &PersistedState) -> Result<(), PersistError>;
}

/// JSON document on the local filesystem.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RevisionStore for JsonFileStore {
    fn load(&self) -> PersistedState {
        load(&self.path)
    }

    fn save(&self, state: &PersistedState) -> Result<(), PersistError> {
        save(&self.path, state)
    }
}

/// Process-local store. Clones share the same state, so a test can keep a
/// handle and inspect what the session saved.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    state: PersistedState,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner { state, saves: 0 })),
        }
    }

    pub fn state(&self) -> PersistedState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .clone()
    }

    pub fn save_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).saves
    }
}

impl RevisionStore for MemoryStore {
    fn load(&self) -> PersistedState {
        self.state()
    }

    fn save(&self, state: &PersistedState) -> Result<(), PersistError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.state = state.clone();
        inner.saves += 1;
        Ok(())
    }
}
