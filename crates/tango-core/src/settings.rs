//! Engine settings loaded from TOML.
//!
//! Defaults are embedded via `include_str!("default_settings.toml")`. Unlike
//! a process-wide singleton, a `Settings` value is handed to each component
//! at construction, so tests and embedders can run several configurations
//! side by side.

use std::time::Duration;

use serde::Deserialize;

use crate::source::SourceId;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

/// Upper bound on prefetch capacity; each slot owns a worker thread.
pub const MAX_BUFFER_CAPACITY: usize = 64;

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub buffer: BufferSettings,
    pub session: SessionSettings,
    pub sources: SourceSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BufferSettings {
    pub capacity: usize,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub complete_delay_ms: u64,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    default_source: String,
    pub jlpt_url_template: String,
    pub request_timeout_secs: u64,
    #[serde(skip)]
    default_source_parsed: SourceId,
}

impl Default for Settings {
    fn default() -> Self {
        parse_settings_toml(DEFAULT_SETTINGS_TOML).expect("settings TOML must be valid")
    }
}

impl Settings {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.buffer.retry_backoff_ms)
    }

    pub fn complete_delay(&self) -> Duration {
        Duration::from_millis(self.session.complete_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.request_timeout_secs)
    }

    /// Source used when nothing was persisted yet.
    pub fn default_source(&self) -> SourceId {
        self.sources.default_source_parsed
    }

    /// Download URL for one JLPT level.
    pub fn jlpt_url(&self, level: u8) -> String {
        self.sources
            .jlpt_url_template
            .replace("{level}", &level.to_string())
    }
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let mut s: Settings =
        toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    s.sources.default_source_parsed = s.sources.default_source.parse().map_err(
        |e: crate::CoreError| SettingsError::InvalidValue {
            field: "sources.default_source".to_string(),
            reason: e.to_string(),
        },
    )?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive!(buffer.capacity);
    check_positive!(buffer.retry_backoff_ms);
    check_positive!(sources.request_timeout_secs);

    if s.buffer.capacity > MAX_BUFFER_CAPACITY {
        return Err(SettingsError::InvalidValue {
            field: "buffer.capacity".to_string(),
            reason: format!("must be at most {MAX_BUFFER_CAPACITY}"),
        });
    }
    if !s.sources.jlpt_url_template.contains("{level}") {
        return Err(SettingsError::InvalidValue {
            field: "sources.jlpt_url_template".to_string(),
            reason: "must contain the {level} placeholder".to_string(),
        });
    }

    Ok(())
}
