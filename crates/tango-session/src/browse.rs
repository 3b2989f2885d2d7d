use std::time::Instant;

use tracing::{debug, info, warn};

use tango_core::{Entry, SourceError, SourceId};

use crate::types::{Phase, SessionError, SessionEvent, SessionState, NO_WORDS_MESSAGE};
use crate::SessionController;

impl SessionController {
    pub(crate) fn advance_browse(&mut self) -> Result<(), SessionError> {
        if self.loading.is_some() {
            return Err(SessionError::NotReady);
        }
        self.pop_next(Instant::now());
        Ok(())
    }

    /// Take the next buffered entry. A miss on a non-empty store schedules a
    /// retry; an empty or exhausted store is reported as an error.
    pub(crate) fn pop_next(&mut self, now: Instant) {
        if let Some(entry) = self.buffer.take() {
            self.retry_at = None;
            self.show(entry);
            return;
        }
        if self.store.is_empty() || self.buffer.is_exhausted() {
            self.fail(NO_WORDS_MESSAGE.to_string());
            return;
        }
        debug!(backoff_ms = self.config.retry_backoff.as_millis() as u64, "prefetch miss");
        self.current = None;
        self.revealed = false;
        self.phase = Phase::Waiting;
        self.retry_at = Some(now + self.config.retry_backoff);
    }

    /// Add the entry on screen to the revision list. Returns `false` when it
    /// was already marked.
    pub fn mark(&mut self) -> Result<bool, SessionError> {
        if !matches!(self.state, SessionState::Browse) {
            return Err(SessionError::NotInBrowse);
        }
        let entry = match (&self.phase, &self.current) {
            (Phase::Showing, Some(entry)) => entry.clone(),
            _ => return Err(SessionError::NothingToMark),
        };
        let added = self.revisions.add(entry)?;
        if added {
            self.persist();
            self.emit(SessionEvent::RevisionsChanged);
        }
        Ok(added)
    }

    /// Make `id` the active source, persist the choice and start loading it.
    /// The caller fetches the entries and hands them to `source_loaded`.
    pub fn switch_source(&mut self, id: SourceId) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Browse) {
            return Err(SessionError::NotInBrowse);
        }
        info!(from = %self.active_source, to = %id, "switching word source");
        self.active_source = id;
        self.persist();
        self.emit(SessionEvent::SourceChanged(id));
        self.begin_loading(id);
        Ok(())
    }

    /// Reload the active source, e.g. at startup or after a failed load.
    pub fn reload(&mut self) -> Result<SourceId, SessionError> {
        if !matches!(self.state, SessionState::Browse) {
            return Err(SessionError::NotInBrowse);
        }
        let id = self.active_source;
        self.begin_loading(id);
        Ok(id)
    }

    fn begin_loading(&mut self, id: SourceId) {
        self.store.clear();
        self.buffer.clear();
        self.loading = Some(id);
        self.current = None;
        self.revealed = false;
        self.retry_at = None;
        self.phase = Phase::Loading;
        self.emit(SessionEvent::Loading(id));
    }

    /// Install the result of loading `id`. Results for a source that is no
    /// longer being loaded are discarded.
    pub fn source_loaded(&mut self, id: SourceId, result: Result<Vec<Entry>, SourceError>) {
        if self.loading != Some(id) {
            debug!(source = %id, "discarding result for inactive load");
            return;
        }
        self.loading = None;
        let browsing = matches!(self.state, SessionState::Browse);

        match result {
            Ok(entries) => {
                let generation = self.store.replace(entries);
                if self.store.is_empty() {
                    let message = format!("No words loaded from {id}!");
                    if browsing {
                        self.fail(message);
                    } else {
                        warn!(%message, "load finished during revision session");
                        self.emit(SessionEvent::SessionError(message));
                    }
                    return;
                }
                info!(source = %id, entries = self.store.size(), generation, "word source loaded");
                self.buffer.start();
                if browsing {
                    self.pop_next(Instant::now());
                }
            }
            Err(e) => {
                let message = format!("Failed to load {id}: {e}");
                if browsing {
                    self.fail(message);
                } else {
                    warn!(%message, "load failed during revision session");
                    self.emit(SessionEvent::SessionError(message));
                }
            }
        }
    }
}
