//! Word source identifiers and the loading seam.
//!
//! The engine never reads dictionary files or talks to the network itself;
//! it asks a `WordSource` for the flat entry list of a given `SourceId`.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::str::FromStr;

use crate::entry::Entry;
use crate::CoreError;

pub const JLPT_LEVELS: std::ops::RangeInclusive<u8> = 1..=5;

/// Which vocabulary list is active: the JMdict dump or one JLPT level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceId {
    #[default]
    Jmdict,
    Jlpt(u8),
}

impl SourceId {
    pub fn jlpt(level: u8) -> Result<Self, CoreError> {
        if JLPT_LEVELS.contains(&level) {
            Ok(Self::Jlpt(level))
        } else {
            Err(CoreError::UnknownSource(format!("JLPT{level}")))
        }
    }

    /// Every known source, JMdict first.
    pub fn all() -> Vec<Self> {
        std::iter::once(Self::Jmdict)
            .chain(JLPT_LEVELS.map(Self::Jlpt))
            .collect()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jmdict => write!(f, "JMdict"),
            Self::Jlpt(level) => write!(f, "JLPT{level}"),
        }
    }
}

impl FromStr for SourceId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "JMdict" {
            return Ok(Self::Jmdict);
        }
        let level = s
            .strip_prefix("JLPT")
            .and_then(|rest| rest.parse::<u8>().ok())
            .ok_or_else(|| CoreError::UnknownSource(s.to_string()))?;
        Self::jlpt(level).map_err(|_| CoreError::UnknownSource(s.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Supplies the raw entry list for a source. Called off the control thread.
pub trait WordSource: Send + Sync {
    fn load(&self, id: SourceId) -> Result<Vec<Entry>, SourceError>;
}

/// In-memory source with fixed lists per identifier, for bundled word lists
/// and tests.
#[derive(Default, Clone)]
pub struct StaticSource {
    lists: HashMap<SourceId, Vec<Entry>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: SourceId, entries: Vec<Entry>) -> Self {
        self.lists.insert(id, entries);
        self
    }
}

impl WordSource for StaticSource {
    fn load(&self, id: SourceId) -> Result<Vec<Entry>, SourceError> {
        self.lists
            .get(&id)
            .cloned()
            .ok_or_else(|| SourceError::Unavailable(format!("{id} is not bundled")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        for id in SourceId::all() {
            assert_eq!(id.to_string().parse::<SourceId>().unwrap(), id);
        }
        assert_eq!("JMdict".parse::<SourceId>().unwrap(), SourceId::Jmdict);
        assert_eq!("JLPT3".parse::<SourceId>().unwrap(), SourceId::Jlpt(3));
    }

    #[test]
    fn test_unknown_sources() {
        for bad in ["", "jmdict", "JLPT", "JLPT0", "JLPT6", "JLPTx", "N5"] {
            assert!(
                matches!(bad.parse::<SourceId>(), Err(CoreError::UnknownSource(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_all_lists_six_sources() {
        let all = SourceId::all();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], SourceId::Jmdict);
        assert_eq!(all[5], SourceId::Jlpt(5));
    }

    #[test]
    fn test_static_source() {
        let source = StaticSource::new().with(SourceId::Jlpt(5), vec![Entry::new("猫", "ねこ")]);
        assert_eq!(source.load(SourceId::Jlpt(5)).unwrap().len(), 1);
        assert!(matches!(
            source.load(SourceId::Jmdict),
            Err(SourceError::Unavailable(_))
        ));
    }
}
