//! Bounded queue of pre-sampled entries, refilled by a worker pool.
//!
//! The pool has one thread per slot of capacity. `start()` issues one refill
//! request per slot and every successful `take()` issues exactly one more,
//! so the number of outstanding requests plus queued entries stays at the
//! capacity in steady state.
//!
//! Requests are tagged with the store generation they were issued for. A
//! worker drops its pick when the store or the buffer has moved on to a
//! newer generation, so entries from a previous source never reach the
//! queue after a reload.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::entry::Entry;
use crate::store::EntryStore;
use crate::CoreError;

pub const DEFAULT_CAPACITY: usize = 5;

struct RefillRequest {
    generation: u64,
}

struct Shared {
    store: Arc<EntryStore>,
    capacity: usize,
    queue: Mutex<VecDeque<Entry>>,
    /// Signalled when an entry is appended or the store turns out empty.
    ready: Condvar,
    /// Generation the buffer currently accepts. Only changed under `queue`.
    generation: AtomicU64,
    exhausted: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn refill(&self, generation: u64) {
        if generation != self.generation.load(Ordering::SeqCst) {
            trace!(generation, "stale refill request dropped");
            return;
        }
        let snapshot = self.store.snapshot();
        if snapshot.generation() != generation {
            return;
        }

        match snapshot.sample_with(&mut rand::thread_rng()) {
            Ok(entry) => {
                let mut queue = lock(&self.queue);
                // Re-check under the lock: `clear()` may have run since the
                // first check, and the capacity bound must hold at all times.
                if generation != self.generation.load(Ordering::SeqCst)
                    || queue.len() >= self.capacity
                {
                    return;
                }
                queue.push_back(entry);
                drop(queue);
                self.ready.notify_one();
            }
            Err(_) => {
                let _queue = lock(&self.queue);
                if generation == self.generation.load(Ordering::SeqCst) {
                    debug!(generation, "prefetch exhausted: store is empty");
                    self.exhausted.store(true, Ordering::SeqCst);
                    self.ready.notify_all();
                }
            }
        }
    }
}

pub struct PrefetchBuffer {
    shared: Arc<Shared>,
    refill_tx: Option<mpsc::Sender<RefillRequest>>,
    workers: Vec<JoinHandle<()>>,
}

impl PrefetchBuffer {
    /// Spawn the worker pool. The buffer stays empty until `start()`.
    pub fn new(store: Arc<EntryStore>, capacity: usize) -> Result<Self, CoreError> {
        if capacity == 0 {
            return Err(CoreError::InvalidCapacity);
        }
        let generation = store.generation();
        let shared = Arc::new(Shared {
            store,
            capacity,
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            ready: Condvar::new(),
            generation: AtomicU64::new(generation),
            exhausted: AtomicBool::new(false),
        });

        let (refill_tx, refill_rx) = mpsc::channel::<RefillRequest>();
        let refill_rx = Arc::new(Mutex::new(refill_rx));
        let mut workers = Vec::with_capacity(capacity);
        for slot in 0..capacity {
            let shared = Arc::clone(&shared);
            let rx = Arc::clone(&refill_rx);
            let handle = thread::Builder::new()
                .name(format!("tango-prefetch-{slot}"))
                .spawn(move || refill_worker(rx, shared))
                .map_err(CoreError::Spawn)?;
            workers.push(handle);
        }

        Ok(Self {
            shared,
            refill_tx: Some(refill_tx),
            workers,
        })
    }

    /// Drop queued entries and follow the store's current generation.
    /// Requests in flight for an older generation will be discarded.
    pub fn clear(&self) {
        let mut queue = lock(&self.shared.queue);
        queue.clear();
        let generation = self.shared.store.generation();
        self.shared.generation.store(generation, Ordering::SeqCst);
        self.shared.exhausted.store(false, Ordering::SeqCst);
    }

    /// Clear, then request one sample per slot from the current store.
    pub fn start(&self) {
        self.clear();
        let generation = self.generation();
        debug!(generation, capacity = self.shared.capacity, "prefetch started");
        for _ in 0..self.shared.capacity {
            self.request(generation);
        }
    }

    /// Pop the front entry without blocking. `None` means the refill is
    /// still in flight (or the store is empty, see `is_exhausted`).
    pub fn take(&self) -> Option<Entry> {
        let entry = lock(&self.shared.queue).pop_front()?;
        self.request(self.generation());
        Some(entry)
    }

    /// Like `take`, but wait up to `timeout` for an entry to arrive.
    /// Returns early once the buffer is known to be exhausted.
    pub fn take_timeout(&self, timeout: Duration) -> Option<Entry> {
        let deadline = Instant::now() + timeout;
        let mut queue = lock(&self.shared.queue);
        loop {
            if let Some(entry) = queue.pop_front() {
                drop(queue);
                self.request(self.generation());
                return Some(entry);
            }
            if self.is_exhausted() {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _) = self
                .shared
                .ready
                .wait_timeout(queue, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            queue = guard;
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.shared.queue).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// True once a refill found the store empty for the current generation.
    pub fn is_exhausted(&self) -> bool {
        self.shared.exhausted.load(Ordering::SeqCst)
    }

    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    fn request(&self, generation: u64) {
        if let Some(tx) = &self.refill_tx {
            let _ = tx.send(RefillRequest { generation });
        }
    }
}

impl Drop for PrefetchBuffer {
    fn drop(&mut self) {
        // Closing the channel ends every worker loop.
        self.refill_tx.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn refill_worker(rx: Arc<Mutex<mpsc::Receiver<RefillRequest>>>, shared: Arc<Shared>) {
    loop {
        let request = {
            let rx = lock(&rx);
            match rx.recv() {
                Ok(request) => request,
                Err(_) => break,
            }
        };
        shared.refill(request.generation);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    fn store_with(entries: Vec<Entry>) -> Arc<EntryStore> {
        let store = Arc::new(EntryStore::new());
        store.replace(entries);
        store
    }

    fn kana(n: usize) -> Vec<Entry> {
        (0..n)
            .map(|i| Entry::new(format!("語{i}"), format!("ご{i}")))
            .collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let store = store_with(kana(3));
        assert!(matches!(
            PrefetchBuffer::new(store, 0),
            Err(CoreError::InvalidCapacity)
        ));
    }

    #[test]
    fn test_empty_until_started() {
        let buffer = PrefetchBuffer::new(store_with(kana(3)), 4).unwrap();
        thread::sleep(Duration::from_millis(20));
        assert!(buffer.is_empty());
        assert!(buffer.take().is_none());
    }

    #[test]
    fn test_start_fills_to_capacity() {
        let buffer = PrefetchBuffer::new(store_with(kana(10)), DEFAULT_CAPACITY).unwrap();
        buffer.start();
        assert!(wait_until(Duration::from_secs(2), || {
            buffer.len() == DEFAULT_CAPACITY
        }));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(buffer.len(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_take_triggers_replacement() {
        let buffer = PrefetchBuffer::new(store_with(kana(10)), 3).unwrap();
        buffer.start();
        assert!(wait_until(Duration::from_secs(2), || buffer.len() == 3));
        for _ in 0..10 {
            assert!(buffer.take_timeout(Duration::from_secs(2)).is_some());
        }
        assert!(wait_until(Duration::from_secs(2), || buffer.len() == 3));
    }

    #[test]
    fn test_never_exceeds_capacity_under_concurrency() {
        let capacity = 4;
        let buffer = Arc::new(PrefetchBuffer::new(store_with(kana(50)), capacity).unwrap());
        buffer.start();

        let taken = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        let monitor = {
            let buffer = Arc::clone(&buffer);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut max_seen = 0;
                while !stop.load(Ordering::SeqCst) {
                    max_seen = max_seen.max(buffer.len());
                }
                max_seen
            })
        };

        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                let taken = Arc::clone(&taken);
                thread::spawn(move || {
                    for _ in 0..100 {
                        if buffer.take_timeout(Duration::from_secs(2)).is_some() {
                            taken.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for c in consumers {
            c.join().unwrap();
        }
        stop.store(true, Ordering::SeqCst);
        let max_seen = monitor.join().unwrap();

        assert_eq!(taken.load(Ordering::SeqCst), 300);
        assert!(max_seen <= capacity, "observed {max_seen} > {capacity}");
        assert!(buffer.len() <= capacity);
    }

    #[test]
    fn test_stale_entries_not_leaked_after_replace() {
        let store = store_with(vec![Entry::new("古", "ふる")]);
        let buffer = PrefetchBuffer::new(Arc::clone(&store), 5).unwrap();
        buffer.start();
        assert!(wait_until(Duration::from_secs(2), || buffer.len() == 5));

        store.clear();
        buffer.clear();
        store.replace(vec![Entry::new("新", "しん")]);
        buffer.start();

        for _ in 0..30 {
            let e = buffer.take_timeout(Duration::from_secs(2)).unwrap();
            assert_eq!(e, Entry::new("新", "しん"));
        }
    }

    #[test]
    fn test_clear_discards_queue() {
        let store = store_with(kana(5));
        let buffer = PrefetchBuffer::new(Arc::clone(&store), 3).unwrap();
        buffer.start();
        assert!(wait_until(Duration::from_secs(2), || buffer.len() == 3));
        store.clear();
        buffer.clear();
        thread::sleep(Duration::from_millis(20));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_exhausted_on_empty_store() {
        let store = Arc::new(EntryStore::new());
        let buffer = PrefetchBuffer::new(store, 3).unwrap();
        buffer.start();
        assert!(wait_until(Duration::from_secs(2), || buffer.is_exhausted()));
        assert!(buffer.take_timeout(Duration::from_secs(5)).is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_restart_after_exhaustion() {
        let store = Arc::new(EntryStore::new());
        let buffer = PrefetchBuffer::new(Arc::clone(&store), 2).unwrap();
        buffer.start();
        assert!(wait_until(Duration::from_secs(2), || buffer.is_exhausted()));

        store.replace(kana(4));
        buffer.start();
        assert!(!buffer.is_exhausted());
        assert!(buffer.take_timeout(Duration::from_secs(2)).is_some());
    }
}
