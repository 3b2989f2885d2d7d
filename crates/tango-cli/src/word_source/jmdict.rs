use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::info;

use tango_core::{Entry, SourceError};

use super::keep_entry;

pub const JMDICT_FILE_NAME: &str = "JMdict_e";

/// The JMdict_e XML dump on local disk.
pub struct JmdictSource {
    path: PathBuf,
}

impl JmdictSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Vec<Entry>, SourceError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                SourceError::Unavailable(format!("{} not found", self.path.display()))
            }
            _ => SourceError::Io(e),
        })?;
        let entries = parse_jmdict(&text);
        info!(path = %self.path.display(), entries = entries.len(), "JMdict parsed");
        Ok(entries)
    }
}

/// Extract `(first keb, first reb)` from every `<entry>` element. The file
/// is scanned textually; DTD and entity declarations are never expanded.
pub fn parse_jmdict(text: &str) -> Vec<Entry> {
    text.split("<entry>")
        .skip(1)
        .filter_map(|chunk| {
            let word = first_element(chunk, "keb").unwrap_or("");
            let reading = first_element(chunk, "reb").unwrap_or("");
            keep_entry(word, reading)
        })
        .collect()
}

fn first_element<'a>(chunk: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = chunk.find(&open)? + open.len();
    let len = chunk[start..].find(&close)?;
    Some(&chunk[start..start + len])
}
