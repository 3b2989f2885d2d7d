use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tango_engine::{Engine, EngineConfig, Mode, SessionEvent, Settings, SourceId};

use crate::commands::revision_ops::print_entries;
use crate::word_source::SourceRegistry;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

const HELP: &str = "\
Enter  reveal the word, or show the next one
m      mark for revision
r      start a revision session
e      end the revision session
l      list marked words
x N    unmark word N of the list
s ID   switch source (JMdict, JLPT1..JLPT5)
q      quit";

pub struct DrillOptions {
    pub revisions_path: PathBuf,
    pub resources_dir: PathBuf,
    pub settings: Settings,
    pub source: Option<SourceId>,
}

/// One line of drill input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrillCommand {
    /// Reveal when the word is hidden, otherwise advance.
    Next,
    Mark,
    StartRevision,
    EndRevision,
    List,
    /// Unmark the N-th (1-based) entry of the list.
    Remove(usize),
    Switch(SourceId),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<DrillCommand, String> {
    let line = line.trim();
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };
    let command = match (cmd, arg) {
        ("", _) | ("n", "") => DrillCommand::Next,
        ("m", "") => DrillCommand::Mark,
        ("r", "") => DrillCommand::StartRevision,
        ("e", "") => DrillCommand::EndRevision,
        ("l", "") => DrillCommand::List,
        ("q", "") => DrillCommand::Quit,
        ("h" | "?", "") => DrillCommand::Help,
        ("x", n) => match n.parse::<usize>() {
            Ok(n) if n > 0 => DrillCommand::Remove(n),
            _ => return Err(format!("expected a list number, got {n:?}")),
        },
        ("s", id) => DrillCommand::Switch(id.parse().map_err(|e| format!("{e}"))?),
        _ => return Err(format!("unknown command {line:?} (h for help)")),
    };
    Ok(command)
}

pub fn drill(options: DrillOptions) {
    let registry = SourceRegistry::new(&options.resources_dir, &options.settings);
    let mut engine = die!(
        Engine::new(EngineConfig {
            revisions_path: options.revisions_path,
            settings: options.settings,
            source: Arc::new(registry),
        }),
        "Error starting drill: {}"
    );
    engine.subscribe(Box::new(print_event));
    if let Some(id) = options.source {
        if id != engine.active_source() {
            die!(engine.set_source(id), "Error: {}");
        }
    }

    let lines = spawn_stdin_reader();
    println!("{HELP}");
    loop {
        engine.tick();
        engine.pump();
        match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => match parse_command(&line) {
                Ok(DrillCommand::Quit) => break,
                Ok(command) => run_command(&mut engine, command),
                Err(message) => eprintln!("{message}"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    engine.pump();
}

fn run_command(engine: &mut Engine, command: DrillCommand) {
    let result = match command {
        DrillCommand::Next => {
            if engine.session().can_reveal() {
                engine.reveal()
            } else {
                engine.advance()
            }
        }
        DrillCommand::Mark => engine.mark().map(|added| {
            if !added {
                println!("(already marked)");
            }
        }),
        DrillCommand::StartRevision => engine.start_revision_session(),
        DrillCommand::EndRevision => engine.end_revision_session(),
        DrillCommand::List => {
            let entries = engine.revisions().all();
            if entries.is_empty() {
                println!("(no marked words)");
            } else {
                print_entries(&entries);
            }
            Ok(())
        }
        DrillCommand::Remove(n) => match engine.revisions().get(n - 1).cloned() {
            Some(entry) => engine.unmark(&entry).map(|_| {
                println!("Unmarked: {}", entry.surface());
            }),
            None => {
                println!("No entry {n} (list has {})", engine.revisions().len());
                Ok(())
            }
        },
        DrillCommand::Switch(id) => engine.set_source(id),
        DrillCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        DrillCommand::Quit => Ok(()),
    };
    if let Err(e) = result {
        eprintln!("{e}");
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::EntryChanged {
            entry,
            revealed: false,
        } => println!("\n  {}", entry.prompt()),
        SessionEvent::EntryChanged {
            entry,
            revealed: true,
        } => {
            if entry.word.is_empty() {
                println!("  {}", entry.reading);
            } else {
                println!("  {}  ({})", entry.word, entry.reading);
            }
        }
        SessionEvent::SessionError(message) => println!("\n  {message}"),
        SessionEvent::RevisionSessionComplete => println!("\n  Revision Session Complete!"),
        SessionEvent::Loading(id) => println!("Loading words... ({id})"),
        SessionEvent::SourceChanged(id) => println!("Source: {id}"),
        SessionEvent::ModeChanged(Mode::Revision) => println!("-- revision --"),
        SessionEvent::ModeChanged(Mode::Browse) => println!("-- browse --"),
        SessionEvent::RevisionsChanged => {}
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("tango-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    die!(spawned, "Error reading input: {}");
    rx
}
