mod jlpt;
mod jmdict;

use std::path::Path;

use tango_core::settings::Settings;
use tango_core::unicode::is_primarily_katakana;
use tango_core::{Entry, SourceError, SourceId, WordSource};

pub use jlpt::{parse_jlpt_csv, JlptSource};
pub use jmdict::{parse_jmdict, JmdictSource, JMDICT_FILE_NAME};

/// Build an entry from a parsed pair. Kana-only katakana words (loanwords)
/// and empty pairs are skipped.
pub(crate) fn keep_entry(word: &str, reading: &str) -> Option<Entry> {
    let word = word.trim();
    let reading = reading.trim();
    if word.is_empty() && is_primarily_katakana(reading) {
        return None;
    }
    let entry = Entry::new(word, reading);
    entry.is_valid().then_some(entry)
}

/// Dispatches each `SourceId` to the source that serves it.
pub struct SourceRegistry {
    jmdict: JmdictSource,
    jlpt: JlptSource,
}

impl SourceRegistry {
    /// JMdict is read from `resources_dir`; JLPT lists are downloaded, with
    /// copies in `resources_dir` as fallback.
    pub fn new(resources_dir: &Path, settings: &Settings) -> Self {
        Self {
            jmdict: JmdictSource::new(resources_dir.join(JMDICT_FILE_NAME)),
            jlpt: JlptSource::new(settings, resources_dir),
        }
    }

    pub fn jlpt(&self) -> &JlptSource {
        &self.jlpt
    }
}

impl WordSource for SourceRegistry {
    fn load(&self, id: SourceId) -> Result<Vec<Entry>, SourceError> {
        match id {
            SourceId::Jmdict => self.jmdict.load(),
            SourceId::Jlpt(level) => self.jlpt.load(level),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_keep_entry() {
        assert_eq!(keep_entry(" 猫 ", "ねこ"), Some(Entry::new("猫", "ねこ")));
        assert_eq!(keep_entry("", "すし"), Some(Entry::new("", "すし")));
        assert_eq!(keep_entry("", "コーヒー"), None);
        assert_eq!(keep_entry("", "ｺｰﾋｰ"), None);
        assert_eq!(keep_entry("珈琲", "コーヒー"), Some(Entry::new("珈琲", "コーヒー")));
        assert_eq!(keep_entry("", ""), None);
    }

    #[test]
    fn test_registry_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(JMDICT_FILE_NAME),
            "<JMdict><entry><k_ele><keb>猫</keb></k_ele><r_ele><reb>ねこ</reb></r_ele></entry></JMdict>",
        )
        .unwrap();
        fs::write(dir.path().join("n5.csv"), "expression,reading\n水,みず\n").unwrap();

        let toml = tango_core::settings::default_toml()
            .replace("https://raw.githubusercontent.com", "http://127.0.0.1:9")
            .replace("request_timeout_secs = 10", "request_timeout_secs = 1");
        let settings = tango_core::settings::parse_settings_toml(&toml).unwrap();
        let registry = SourceRegistry::new(dir.path(), &settings);

        assert_eq!(
            registry.load(SourceId::Jmdict).unwrap(),
            vec![Entry::new("猫", "ねこ")]
        );
        assert_eq!(
            registry.load(SourceId::Jlpt(5)).unwrap(),
            vec![Entry::new("水", "みず")]
        );
        assert!(registry.load(SourceId::Jlpt(1)).is_err());
    }
}
