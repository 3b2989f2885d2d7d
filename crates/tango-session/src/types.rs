use std::time::{Duration, Instant};

use tango_core::prefetch::DEFAULT_CAPACITY;
use tango_core::settings::Settings;
use tango_core::{CoreError, Entry, SourceId};

pub(crate) const LOADING_MESSAGE: &str = "Loading words...";
pub(crate) const WAITING_MESSAGE: &str = "...";
pub(crate) const NO_WORDS_MESSAGE: &str = "No words loaded!";
pub(crate) const COMPLETE_MESSAGE: &str = "Revision Session Complete!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Endless random review fed by the prefetch buffer.
    Browse,
    /// Finite shuffled walk over the revision list.
    Revision,
}

/// What the presentation layer should be showing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// A source load is in flight; controls are disabled.
    Loading,
    /// The next entry has not arrived from the prefetch buffer yet.
    Waiting,
    /// The current entry is on screen.
    Showing,
    /// The revision queue is finished; browsing resumes after a delay.
    Complete,
    /// No words available. Cleared only by a successful source load.
    Error(String),
}

/// Notifications for the presentation layer, drained with
/// `SessionController::take_events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    EntryChanged { entry: Entry, revealed: bool },
    SessionError(String),
    RevisionSessionComplete,
    Loading(SourceId),
    SourceChanged(SourceId),
    ModeChanged(Mode),
    RevisionsChanged,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no entries marked for revision")]
    EmptySession,

    #[error("entry is already revealed")]
    AlreadyRevealed,

    #[error("no entry to reveal")]
    NothingToReveal,

    #[error("no entry to mark")]
    NothingToMark,

    #[error("only available in browse mode")]
    NotInBrowse,

    #[error("no revision session in progress")]
    NotInRevision,

    #[error("words are still loading")]
    NotReady,

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub buffer_capacity: usize,
    pub retry_backoff: Duration,
    pub complete_delay: Duration,
    /// Fixed seed for the revision shuffle. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_CAPACITY,
            retry_backoff: Duration::from_millis(100),
            complete_delay: Duration::from_secs(2),
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            buffer_capacity: settings.buffer.capacity,
            retry_backoff: settings.retry_backoff(),
            complete_delay: settings.complete_delay(),
            seed: settings.session.seed,
        }
    }
}

pub(crate) enum SessionState {
    Browse,
    Revision(RevisionSession),
}

pub(crate) struct RevisionSession {
    pub(crate) queue: Vec<Entry>,
    /// Cursor into `queue`; `queue.len()` means the session is complete.
    pub(crate) index: usize,
    /// When the completed session hands back to browse mode.
    pub(crate) complete_at: Option<Instant>,
}

impl RevisionSession {
    pub(crate) fn new(queue: Vec<Entry>) -> Self {
        Self {
            queue,
            index: 0,
            complete_at: None,
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.index >= self.queue.len()
    }
}
