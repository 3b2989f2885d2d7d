use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use tango_core::settings::Settings;
use tango_core::{Entry, SourceError};

use super::keep_entry;

/// JLPT vocabulary lists, one CSV per level (`expression,reading,...`).
pub struct JlptSource {
    url_template: String,
    local_dir: PathBuf,
    timeout: Duration,
}

impl JlptSource {
    pub fn new(settings: &Settings, local_dir: &Path) -> Self {
        Self {
            url_template: settings.sources.jlpt_url_template.clone(),
            local_dir: local_dir.to_path_buf(),
            timeout: settings.request_timeout(),
        }
    }

    pub fn url(&self, level: u8) -> String {
        self.url_template.replace("{level}", &level.to_string())
    }

    /// Where `fetch` stores a level and where `load` looks when offline.
    pub fn local_path(&self, level: u8) -> PathBuf {
        self.local_dir.join(format!("n{level}.csv"))
    }

    /// Download the level's list, falling back to the local copy when the
    /// download fails.
    pub fn load(&self, level: u8) -> Result<Vec<Entry>, SourceError> {
        let text = match self.download(level) {
            Ok(text) => text,
            Err(e) => {
                let local = self.local_path(level);
                if !local.exists() {
                    return Err(e);
                }
                warn!(level, error = %e, path = %local.display(), "download failed, using local copy");
                fs::read_to_string(&local)?
            }
        };
        let entries = parse_jlpt_csv(&text);
        info!(level, entries = entries.len(), "JLPT list parsed");
        Ok(entries)
    }

    /// Download the level's list into `local_path(level)`. Returns the
    /// path written and the number of usable entries.
    pub fn fetch(&self, level: u8) -> Result<(PathBuf, usize), SourceError> {
        let text = self.download(level)?;
        let dest = self.local_path(level);
        fs::create_dir_all(&self.local_dir)?;
        fs::write(&dest, &text)?;
        Ok((dest, parse_jlpt_csv(&text).len()))
    }

    fn download(&self, level: u8) -> Result<String, SourceError> {
        let url = self.url(level);
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build()
            .into();
        agent
            .get(&url)
            .call()
            .map_err(|e| SourceError::Http(format!("{url}: {e}")))?
            .into_body()
            .read_to_string()
            .map_err(|e| SourceError::Http(format!("{url}: {e}")))
    }
}

/// Parse a JLPT CSV. The first line is a header; column 0 is the
/// expression and column 1 the reading. Lines with fewer columns are
/// skipped.
pub fn parse_jlpt_csv(text: &str) -> Vec<Entry> {
    text.trim()
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split(',');
            let expression = fields.next()?;
            let reading = fields.next()?;
            keep_entry(expression, reading)
        })
        .collect()
}
