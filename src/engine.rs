use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use tango_core::revisions::{self, JsonFileStore};
use tango_core::settings::Settings;
use tango_core::{CoreError, Entry, EntryStore, RevisionList, RevisionStore, SourceId, WordSource};
use tango_session::{Phase, SessionConfig, SessionController, SessionError, SessionEvent};

use crate::async_worker::SourceLoader;

/// Callback invoked on the pumping thread for every session event.
pub type Subscriber = Box<dyn FnMut(&SessionEvent) + Send>;

pub struct EngineConfig {
    /// JSON document holding the revision list and the active source.
    pub revisions_path: PathBuf,
    pub settings: Settings,
    pub source: Arc<dyn WordSource>,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to spawn source loader: {0}")]
    Spawn(#[source] io::Error),
}

/// Session controller plus the background loader that feeds it.
///
/// Not `Sync`: one control thread calls the operations, `tick` and `pump`.
/// Subscribers run inside `pump`, on that same thread.
pub struct Engine {
    controller: SessionController,
    loader: SourceLoader,
    subscribers: Vec<Subscriber>,
}

impl Engine {
    /// Restore state from `revisions_path` and start loading the saved
    /// source. On first run (no usable file yet, a corrupt one included) the
    /// settings' default source is used instead.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let first_run = revisions::load_existing(&config.revisions_path).is_none();
        let persistence = JsonFileStore::new(config.revisions_path);
        let default_source = first_run.then(|| config.settings.default_source());
        Self::build(
            Box::new(persistence),
            &config.settings,
            config.source,
            default_source,
        )
    }

    /// Like `new`, with a caller-provided revision store.
    pub fn with_store(
        persistence: Box<dyn RevisionStore>,
        settings: &Settings,
        source: Arc<dyn WordSource>,
    ) -> Result<Self, EngineError> {
        Self::build(persistence, settings, source, None)
    }

    fn build(
        persistence: Box<dyn RevisionStore>,
        settings: &Settings,
        source: Arc<dyn WordSource>,
        default_source: Option<SourceId>,
    ) -> Result<Self, EngineError> {
        let controller = SessionController::new(
            Arc::new(EntryStore::new()),
            persistence,
            SessionConfig::from_settings(settings),
        )?;
        let loader = SourceLoader::new(source).map_err(EngineError::Spawn)?;
        let mut engine = Self {
            controller,
            loader,
            subscribers: Vec::new(),
        };

        match default_source {
            Some(id) if id != engine.controller.active_source() => engine.set_source(id)?,
            _ => engine.reload()?,
        }
        info!(source = %engine.controller.active_source(), "engine started");
        Ok(engine)
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    /// Hand finished loads to the controller, then deliver queued events to
    /// the subscribers. Returns the number of events delivered.
    pub fn pump(&mut self) -> usize {
        while let Some(loaded) = self.loader.try_recv() {
            if loaded.generation != self.loader.generation() {
                debug!(source = %loaded.id, generation = loaded.generation, "stale load discarded");
                continue;
            }
            self.controller.source_loaded(loaded.id, loaded.result);
        }

        let events = self.controller.take_events();
        for event in &events {
            for subscriber in &mut self.subscribers {
                subscriber(event);
            }
        }
        events.len()
    }

    /// Run due timers (prefetch retry, end of a completed revision session).
    pub fn tick(&mut self) {
        self.controller.tick();
    }

    /// Pump and tick until something other than a loading or waiting screen
    /// is up. Returns `false` on timeout.
    pub fn wait_ready(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            self.tick();
            if !matches!(self.controller.phase(), Phase::Loading | Phase::Waiting) {
                self.pump();
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    pub fn advance(&mut self) -> Result<(), SessionError> {
        self.controller.advance()
    }

    pub fn reveal(&mut self) -> Result<(), SessionError> {
        self.controller.reveal()
    }

    pub fn mark(&mut self) -> Result<bool, SessionError> {
        self.controller.mark()
    }

    pub fn unmark(&mut self, entry: &Entry) -> Result<bool, SessionError> {
        self.controller.unmark(entry)
    }

    pub fn start_revision_session(&mut self) -> Result<(), SessionError> {
        self.controller.start_revision_session()
    }

    pub fn end_revision_session(&mut self) -> Result<(), SessionError> {
        self.controller.end_revision_session()
    }

    /// Switch to `id`, persist the choice and load it in the background.
    pub fn set_source(&mut self, id: SourceId) -> Result<(), SessionError> {
        self.controller.switch_source(id)?;
        self.loader.submit(id);
        Ok(())
    }

    /// Load the active source again, e.g. after a failed download.
    pub fn reload(&mut self) -> Result<(), SessionError> {
        let id = self.controller.reload()?;
        self.loader.submit(id);
        Ok(())
    }

    pub fn revisions(&self) -> &RevisionList {
        self.controller.revisions()
    }

    pub fn active_source(&self) -> SourceId {
        self.controller.active_source()
    }

    pub fn display(&self) -> String {
        self.controller.display_text()
    }

    /// Read-only view of the session for rendering controls.
    pub fn session(&self) -> &SessionController {
        &self.controller
    }
}
