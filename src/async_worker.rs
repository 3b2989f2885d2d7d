use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;

use tracing::{debug, debug_span};

use tango_core::{Entry, SourceError, SourceId, WordSource};

// ---------------------------------------------------------------------------
// Work / Result types
// ---------------------------------------------------------------------------

pub(crate) struct LoadWork {
    pub id: SourceId,
    pub generation: u64,
}

pub(crate) struct LoadResult {
    pub id: SourceId,
    pub generation: u64,
    pub result: Result<Vec<Entry>, SourceError>,
}

// ---------------------------------------------------------------------------
// SourceLoader
// ---------------------------------------------------------------------------

/// Runs `WordSource::load` off the control thread. Every submission bumps
/// the generation; results for older generations are never delivered.
pub(crate) struct SourceLoader {
    work_tx: mpsc::Sender<LoadWork>,
    result_rx: Mutex<mpsc::Receiver<LoadResult>>,
    generation: Arc<AtomicU64>,
}

impl SourceLoader {
    pub fn new(source: Arc<dyn WordSource>) -> Result<Self, io::Error> {
        let generation = Arc::new(AtomicU64::new(0));
        let (work_tx, work_rx) = mpsc::channel::<LoadWork>();
        let (result_tx, result_rx) = mpsc::channel::<LoadResult>();
        {
            let generation = Arc::clone(&generation);
            thread::Builder::new()
                .name("tango-loader".into())
                .spawn(move || load_worker(work_rx, result_tx, generation, source))?;
        }

        Ok(Self {
            work_tx,
            result_rx: Mutex::new(result_rx),
            generation,
        })
    }

    pub fn submit(&self, id: SourceId) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.work_tx.send(LoadWork { id, generation });
        generation
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn try_recv(&self) -> Option<LoadResult> {
        let rx = self.result_rx.lock().unwrap_or_else(PoisonError::into_inner);
        rx.try_recv().ok()
    }
}

// ---------------------------------------------------------------------------
// Worker thread
// ---------------------------------------------------------------------------

fn load_worker(
    rx: mpsc::Receiver<LoadWork>,
    tx: mpsc::Sender<LoadResult>,
    generation: Arc<AtomicU64>,
    source: Arc<dyn WordSource>,
) {
    while let Ok(work) = rx.recv() {
        // Drain: if several loads queued up, only the latest matters
        let mut latest = work;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }

        if latest.generation != generation.load(Ordering::SeqCst) {
            continue;
        }

        let result = {
            let _span = debug_span!("load_source", source = %latest.id).entered();
            source.load(latest.id)
        };

        // Check staleness again: the user may have switched while loading
        if latest.generation != generation.load(Ordering::SeqCst) {
            debug!(source = %latest.id, "load superseded, dropping result");
            continue;
        }
        if tx
            .send(LoadResult {
                id: latest.id,
                generation: latest.generation,
                result,
            })
            .is_err()
        {
            break;
        }
    }
}
