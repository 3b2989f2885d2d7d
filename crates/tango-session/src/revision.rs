use std::time::Instant;

use rand::seq::SliceRandom;
use tracing::{debug, info};

use tango_core::Entry;

use crate::types::{Mode, Phase, RevisionSession, SessionError, SessionEvent, SessionState};
use crate::SessionController;

/// What the queue repair left the screen needing.
enum Repair {
    Nothing,
    Show(Entry),
    End,
}

impl SessionController {
    /// Shuffle the revision list into a queue and show its first entry.
    pub fn start_revision_session(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Browse) {
            return Err(SessionError::NotInBrowse);
        }
        if self.revisions.is_empty() {
            return Err(SessionError::EmptySession);
        }

        let mut queue = self.revisions.all();
        queue.shuffle(&mut self.rng);
        let first = queue[0].clone();
        info!(entries = queue.len(), "revision session started");

        self.retry_at = None;
        self.state = SessionState::Revision(RevisionSession::new(queue));
        self.emit(SessionEvent::ModeChanged(Mode::Revision));
        self.show(first);
        Ok(())
    }

    /// Step through the queue. Past the last entry the session completes
    /// and arms the timer that returns to browse mode; further calls are
    /// no-ops until then.
    pub(crate) fn advance_revision(&mut self) -> Result<(), SessionError> {
        let complete_at = Instant::now() + self.config.complete_delay;
        let SessionState::Revision(session) = &mut self.state else {
            return Err(SessionError::NotInRevision);
        };
        if session.is_complete() {
            return Ok(());
        }

        session.index += 1;
        match session.queue.get(session.index).cloned() {
            Some(entry) => self.show(entry),
            None => {
                session.complete_at = Some(complete_at);
                info!("revision session complete");
                self.current = None;
                self.revealed = false;
                self.phase = Phase::Complete;
                self.emit(SessionEvent::RevisionSessionComplete);
            }
        }
        Ok(())
    }

    /// Leave revision mode, discarding the rest of the queue, and resume
    /// browsing.
    pub fn end_revision_session(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Revision(_)) {
            return Err(SessionError::NotInRevision);
        }
        info!("revision session ended");
        self.state = SessionState::Browse;
        self.current = None;
        self.revealed = false;
        self.emit(SessionEvent::ModeChanged(Mode::Browse));

        if self.loading.is_some() {
            self.phase = Phase::Loading;
        } else {
            self.pop_next(Instant::now());
        }
        Ok(())
    }

    /// Remove every copy of `entry` from a live queue and keep the cursor
    /// valid. Entries already shown shift the cursor back, and the entry
    /// under the cursor is shown again from its reading.
    pub(crate) fn repair_revision_queue(&mut self, entry: &Entry) {
        let SessionState::Revision(session) = &mut self.state else {
            return;
        };

        let repair = if session.is_complete() {
            session.queue.retain(|e| e != entry);
            session.index = session.queue.len();
            if session.queue.is_empty() {
                Repair::End
            } else {
                Repair::Nothing
            }
        } else {
            let before = session.queue[..session.index]
                .iter()
                .filter(|e| *e == entry)
                .count();
            let current_removed = session.queue[session.index] == *entry;
            session.queue.retain(|e| e != entry);
            session.index -= before;

            if session.queue.is_empty() {
                Repair::End
            } else {
                if current_removed {
                    debug!("current revision entry removed");
                }
                session.index = session.index.min(session.queue.len() - 1);
                Repair::Show(session.queue[session.index].clone())
            }
        };

        match repair {
            Repair::Nothing => {}
            Repair::Show(next) => self.show(next),
            Repair::End => {
                debug!("revision queue emptied");
                let _ = self.end_revision_session();
            }
        }
    }
}
