use std::fs;

use tango_core::settings::{self, Settings};

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let s = load_settings(Some(file));
    println!(
        "OK: buffer.capacity={}, session.complete_delay_ms={}, sources.default_source={}",
        s.buffer.capacity,
        s.session.complete_delay_ms,
        s.default_source()
    );
}

/// Settings from `file`, or the embedded defaults.
pub fn load_settings(file: Option<&str>) -> Settings {
    match file {
        Some(file) => {
            let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
            die!(settings::parse_settings_toml(&content), "Error: {}")
        }
        None => Settings::default(),
    }
}
