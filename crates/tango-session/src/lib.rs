//! Dual-mode drill session: endless random browsing and finite revision runs.
//!
//! `SessionController` owns the session state and is driven from a single
//! control thread. Every public operation records its notifications in an
//! outbox; the caller drains them with `take_events` and forwards them to
//! whatever displays the word or plays its audio.

mod browse;
mod revision;
pub(crate) mod types;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use tango_core::{EntryStore, PersistedState, PrefetchBuffer, RevisionList, RevisionStore};
use tango_core::{Entry, SourceId};

pub use types::{Mode, Phase, SessionConfig, SessionError, SessionEvent};

use types::{SessionState, COMPLETE_MESSAGE, LOADING_MESSAGE, WAITING_MESSAGE};

pub struct SessionController {
    store: Arc<EntryStore>,
    buffer: PrefetchBuffer,
    revisions: RevisionList,
    persistence: Box<dyn RevisionStore>,
    active_source: SourceId,
    config: SessionConfig,
    rng: StdRng,

    state: SessionState,
    phase: Phase,
    current: Option<Entry>,
    revealed: bool,
    /// Source whose load is in flight.
    loading: Option<SourceId>,
    /// Browse mode: when to retry after a prefetch miss.
    retry_at: Option<Instant>,

    events: Vec<SessionEvent>,
}

impl SessionController {
    /// Restore the revision list and source preference from `persistence`
    /// and spawn the prefetch pool. Nothing is shown until a source loads.
    pub fn new(
        store: Arc<EntryStore>,
        persistence: Box<dyn RevisionStore>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let persisted = persistence.load();
        let buffer = PrefetchBuffer::new(Arc::clone(&store), config.buffer_capacity)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            revisions = persisted.revisions.len(),
            source = %persisted.active_source,
            "session restored"
        );

        Ok(Self {
            store,
            buffer,
            revisions: RevisionList::from_entries(persisted.revisions),
            persistence,
            active_source: persisted.active_source,
            config,
            rng,
            state: SessionState::Browse,
            phase: Phase::Waiting,
            current: None,
            revealed: false,
            loading: None,
            retry_at: None,
            events: Vec::new(),
        })
    }

    /// Show the next entry: a buffered random pick in browse mode, the next
    /// queued entry in revision mode.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Browse => self.advance_browse(),
            SessionState::Revision(_) => self.advance_revision(),
        }
    }

    /// Expand the current entry from its reading to the full word.
    pub fn reveal(&mut self) -> Result<(), SessionError> {
        let entry = match (&self.phase, &self.current) {
            (Phase::Showing, Some(entry)) => entry.clone(),
            _ => return Err(SessionError::NothingToReveal),
        };
        if self.revealed {
            return Err(SessionError::AlreadyRevealed);
        }
        self.revealed = true;
        self.emit(SessionEvent::EntryChanged {
            entry,
            revealed: true,
        });
        Ok(())
    }

    /// Drop `entry` from the revision list. Allowed in both modes; a live
    /// revision session is repaired so its cursor stays in bounds.
    pub fn unmark(&mut self, entry: &Entry) -> Result<bool, SessionError> {
        if !self.revisions.remove(entry) {
            return Ok(false);
        }
        self.persist();
        self.emit(SessionEvent::RevisionsChanged);
        self.repair_revision_queue(entry);
        Ok(true)
    }

    /// Run due timers: the browse retry after a prefetch miss and the
    /// automatic end of a completed revision session.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        match &self.state {
            SessionState::Revision(session) => {
                if session.complete_at.is_some_and(|at| now >= at) {
                    let _ = self.end_revision_session();
                }
            }
            SessionState::Browse => {
                if self.phase == Phase::Waiting && self.retry_at.is_some_and(|at| now >= at) {
                    self.pop_next(now);
                }
            }
        }
    }

    /// Take queued notifications, clearing the outbox.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn mode(&self) -> Mode {
        match self.state {
            SessionState::Browse => Mode::Browse,
            SessionState::Revision(_) => Mode::Revision,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn current(&self) -> Option<&Entry> {
        self.current.as_ref()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn revisions(&self) -> &RevisionList {
        &self.revisions
    }

    pub fn active_source(&self) -> SourceId {
        self.active_source
    }

    pub fn store(&self) -> &Arc<EntryStore> {
        &self.store
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// `(position, total)` of a revision session; position equals total
    /// once the session is complete.
    pub fn revision_progress(&self) -> Option<(usize, usize)> {
        match &self.state {
            SessionState::Revision(session) => Some((
                session.index.min(session.queue.len()),
                session.queue.len(),
            )),
            SessionState::Browse => None,
        }
    }

    /// Text for the main word label.
    pub fn display_text(&self) -> String {
        match &self.phase {
            Phase::Loading => LOADING_MESSAGE.to_string(),
            Phase::Waiting => WAITING_MESSAGE.to_string(),
            Phase::Complete => COMPLETE_MESSAGE.to_string(),
            Phase::Error(message) => message.clone(),
            Phase::Showing => match &self.current {
                Some(entry) if self.revealed => entry.surface().to_string(),
                Some(entry) => entry.prompt().to_string(),
                None => WAITING_MESSAGE.to_string(),
            },
        }
    }

    pub fn can_reveal(&self) -> bool {
        self.phase == Phase::Showing && self.current.is_some() && !self.revealed
    }

    /// The next control is offered once the current word has been revealed.
    pub fn can_advance(&self) -> bool {
        self.phase == Phase::Showing && self.revealed
    }

    pub fn can_mark(&self) -> bool {
        self.mode() == Mode::Browse
            && self.phase == Phase::Showing
            && self
                .current
                .as_ref()
                .is_some_and(|entry| !self.revisions.contains(entry))
    }

    pub fn can_switch_source(&self) -> bool {
        self.mode() == Mode::Browse
    }

    pub fn can_start_revision(&self) -> bool {
        self.mode() == Mode::Browse && !self.revisions.is_empty()
    }

    fn emit(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    /// Put `entry` on screen, hidden, and announce it.
    fn show(&mut self, entry: Entry) {
        self.current = Some(entry.clone());
        self.revealed = false;
        self.phase = Phase::Showing;
        self.emit(SessionEvent::EntryChanged {
            entry,
            revealed: false,
        });
    }

    fn fail(&mut self, message: String) {
        warn!(%message, "session error");
        self.current = None;
        self.revealed = false;
        self.retry_at = None;
        self.phase = Phase::Error(message.clone());
        self.emit(SessionEvent::SessionError(message));
    }

    /// Save failures are logged, never propagated.
    fn persist(&self) {
        let state = PersistedState {
            revisions: self.revisions.all(),
            active_source: self.active_source,
        };
        if let Err(e) = self.persistence.save(&state) {
            warn!(error = %e, "failed to save revisions");
        }
    }
}
