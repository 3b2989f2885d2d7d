
use std::thread;
use std::time::{Duration, Instant};

use tango_core::revisions::MemoryStore;
use tango_core::{Entry, EntryStore, PersistedState, SourceId};

use super::*;

pub(super) fn words() -> Vec<Entry> {
    vec![
        Entry::new("猫", "ねこ"),
        Entry::new("犬", "いぬ"),
        Entry::new("鳥", "とり"),
        Entry::new("", "すし"),
    ]
}

pub(super) fn test_config() -> SessionConfig {
    SessionConfig {
        buffer_capacity: 3,
        retry_backoff: Duration::from_millis(2),
        complete_delay: Duration::from_millis(50),
        seed: Some(7),
    }
}

pub(super) fn make_controller(state: PersistedState) -> (SessionController, MemoryStore) {
    let persistence = MemoryStore::with_state(state);
    let controller = SessionController::new(
        Arc::new(EntryStore::new()),
        Box::new(persistence.clone()),
        test_config(),
    )
    .unwrap();
    (controller, persistence)
}

/// Controller with `entries` loaded into the active source and the first
/// entry on screen.
pub(super) fn make_loaded(entries: Vec<Entry>) -> (SessionController, MemoryStore) {
    let (mut controller, persistence) = make_controller(PersistedState::default());
    let id = controller.reload().unwrap();
    controller.source_loaded(id, Ok(entries));
    settle(&mut controller);
    controller.take_events();
    (controller, persistence)
}

/// Drive the retry timer until the prefetch buffer has delivered.
pub(super) fn settle(controller: &mut SessionController) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while *controller.phase() == Phase::Waiting && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
        controller.tick();
    }
}

pub(super) fn revisions_state(entries: Vec<Entry>) -> PersistedState {
    PersistedState {
        revisions: entries,
        active_source: SourceId::Jmdict,
    }
}

// --- construction ---

#[test]
fn test_new_restores_persisted_state() {
    let (controller, persistence) = make_controller(PersistedState {
        revisions: vec![Entry::new("猫", "ねこ")],
        active_source: SourceId::Jlpt(2),
    });
    assert_eq!(controller.active_source(), SourceId::Jlpt(2));
    assert_eq!(controller.revisions().len(), 1);
    assert_eq!(controller.mode(), Mode::Browse);
    assert_eq!(controller.buffer_capacity(), 3);
    assert_eq!(persistence.save_count(), 0);
}

#[test]
fn test_new_rejects_zero_capacity() {
    let config = SessionConfig {
        buffer_capacity: 0,
        ..test_config()
    };
    let result = SessionController::new(
        Arc::new(EntryStore::new()),
        Box::new(MemoryStore::new()),
        config,
    );
    assert!(matches!(
        result,
        Err(SessionError::Core(tango_core::CoreError::InvalidCapacity))
    ));
}

#[test]
fn test_config_from_settings() {
    let settings = tango_core::settings::Settings::default();
    let config = SessionConfig::from_settings(&settings);
    assert_eq!(config.buffer_capacity, 5);
    assert_eq!(config.retry_backoff, Duration::from_millis(100));
    assert_eq!(config.complete_delay, Duration::from_secs(2));
    assert_eq!(config.seed, None);
}
