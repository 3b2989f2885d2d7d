//! Japanese vocabulary drill engine.
//!
//! `Engine` ties together the word store, the prefetch buffer, the
//! revision list and the session state machine, and loads word sources on
//! a background thread. Presentation layers drive it from one thread:
//! call the operations, then `tick()` and `pump()` periodically, and react
//! to the `SessionEvent`s delivered to subscribers.

mod async_worker;
pub mod engine;
pub mod trace_init;

pub use engine::{Engine, EngineConfig, EngineError, Subscriber};

pub use tango_core::settings::{Settings, SettingsError};
pub use tango_core::{Entry, RevisionList, SourceError, SourceId, WordSource};
pub use tango_session::{Mode, Phase, SessionError, SessionEvent};
