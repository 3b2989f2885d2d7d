use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tango_cli::commands::drill_ops::{self, DrillOptions};
use tango_cli::commands::{config_ops, revision_ops, source_ops};

#[derive(Parser)]
#[command(name = "tangotool", about = "Japanese vocabulary drill tool")]
struct Cli {
    /// Settings TOML file (default: embedded settings)
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Data directory (default: $XDG_DATA_HOME/tango)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive drill in the terminal
    Drill {
        /// Word source to start with (JMdict, JLPT1..JLPT5)
        #[arg(long)]
        source: Option<String>,
    },
    /// Manage the revision list
    Revisions {
        #[command(subcommand)]
        action: RevisionAction,
    },
    /// Print random words from a source
    Sample {
        /// Word source (JMdict, JLPT1..JLPT5)
        #[arg(long, default_value = "JMdict")]
        source: String,
        /// Number of words
        #[arg(short, long, default_value = "10")]
        n: usize,
    },
    /// Download JLPT word lists for offline use
    Fetch {
        /// JLPT level 1-5 (default: all levels)
        #[arg(long)]
        level: Option<u8>,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

#[derive(Subcommand)]
enum RevisionAction {
    /// List marked words
    List,
    /// Mark a word
    Add {
        /// Reading (kana)
        reading: String,
        /// Written form; empty for kana-only words
        #[arg(default_value = "")]
        word: String,
    },
    /// Unmark a word
    Remove {
        /// Reading (kana)
        reading: String,
        /// Written form; empty for kana-only words
        #[arg(default_value = "")]
        word: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(revision_ops::default_data_dir);
    let revisions_path = revision_ops::revisions_path(&data_dir);
    let resources_dir = revision_ops::resources_dir(&data_dir);

    match cli.command {
        Command::Drill { source } => {
            if fs::create_dir_all(&data_dir).is_ok() {
                tango_engine::trace_init::init_tracing(&data_dir);
            }
            let source = source.map(|s| {
                s.parse().unwrap_or_else(|e| {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                })
            });
            drill_ops::drill(DrillOptions {
                revisions_path,
                resources_dir,
                settings: config_ops::load_settings(cli.settings.as_deref()),
                source,
            });
        }
        Command::Revisions { action } => match action {
            RevisionAction::List => revision_ops::revisions_list(&revisions_path),
            RevisionAction::Add { reading, word } => {
                revision_ops::revisions_add(&revisions_path, &reading, &word)
            }
            RevisionAction::Remove { reading, word } => {
                revision_ops::revisions_remove(&revisions_path, &reading, &word)
            }
        },
        Command::Sample { source, n } => {
            let settings = config_ops::load_settings(cli.settings.as_deref());
            source_ops::sample(&resources_dir, &settings, &source, n)
        }
        Command::Fetch { level } => {
            let settings = config_ops::load_settings(cli.settings.as_deref());
            source_ops::fetch(&resources_dir, &settings, level)
        }
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
