use std::path::Path;

use tango_core::settings::Settings;
use tango_core::source::JLPT_LEVELS;
use tango_core::{EntryStore, SourceId, WordSource};

use crate::word_source::SourceRegistry;

/// Load `source` and print `n` uniformly random entries.
pub fn sample(resources_dir: &Path, settings: &Settings, source: &str, n: usize) {
    let id: SourceId = die!(source.parse(), "Error: {}");
    let registry = SourceRegistry::new(resources_dir, settings);
    let entries = die!(registry.load(id), "Error loading {id}: {}");

    let store = EntryStore::new();
    store.replace(entries);
    eprintln!("{id}: {} entries", store.size());
    for _ in 0..n {
        let entry = die!(store.sample(), "Error: {}");
        println!("{}\t{}", entry.reading, entry.word);
    }
}

/// Download JLPT lists into `resources_dir` for offline use.
pub fn fetch(resources_dir: &Path, settings: &Settings, level: Option<u8>) {
    let levels: Vec<u8> = match level {
        Some(level) => {
            die!(SourceId::jlpt(level), "Error: {}");
            vec![level]
        }
        None => JLPT_LEVELS.collect(),
    };

    let registry = SourceRegistry::new(resources_dir, settings);
    for level in levels {
        eprintln!("Fetching {}...", registry.jlpt().url(level));
        let (path, count) = die!(registry.jlpt().fetch(level), "Error fetching JLPT{level}: {}");
        println!("JLPT{level}: {count} entries → {}", path.display());
    }
}
