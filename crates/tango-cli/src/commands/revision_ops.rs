use std::env;
use std::path::{Path, PathBuf};

use tango_core::revisions::{self, DEFAULT_FILE_NAME};
use tango_core::{Entry, RevisionList};

/// `$XDG_DATA_HOME/tango`, else `~/.local/share/tango`.
pub fn default_data_dir() -> PathBuf {
    match env::var_os("XDG_DATA_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir).join("tango"),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share/tango")
        }
    }
}

pub fn revisions_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DEFAULT_FILE_NAME)
}

pub fn resources_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("resources")
}

pub fn revisions_list(path: &Path) {
    let state = revisions::load(path);
    println!("Source: {}", state.active_source);
    if state.revisions.is_empty() {
        println!("(empty)");
        return;
    }
    print_entries(&state.revisions);
    println!("---");
    println!("{} entries", state.revisions.len());
}

pub fn revisions_add(path: &Path, reading: &str, word: &str) {
    let mut state = revisions::load(path);
    let mut list = RevisionList::from_entries(state.revisions);
    let entry = Entry::new(word, reading);
    if die!(list.add(entry), "Error: {}") {
        state.revisions = list.all();
        die!(revisions::save(path, &state), "Error saving revisions: {}");
        println!("Added: {reading} → {word}");
    } else {
        println!("Already marked: {reading} → {word}");
    }
}

pub fn revisions_remove(path: &Path, reading: &str, word: &str) {
    let mut state = revisions::load(path);
    let mut list = RevisionList::from_entries(state.revisions);
    if list.remove(&Entry::new(word, reading)) {
        state.revisions = list.all();
        die!(revisions::save(path, &state), "Error saving revisions: {}");
        println!("Removed: {reading} → {word}");
    } else {
        println!("Not found: {reading} → {word}");
    }
}

/// Numbered listing, 1-based to match the drill's `x N` command.
pub fn print_entries(entries: &[Entry]) {
    for (i, entry) in entries.iter().enumerate() {
        println!("{:>3}. {}\t{}", i + 1, entry.reading, entry.word);
    }
}
