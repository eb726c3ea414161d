//! distlog CLI: inspect and operate a WAL-backed change log.
//!
//! `distlog [--db DIR] [--config FILE] [--json] COMMAND`
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

mod commands;
mod format;
mod parse;

use std::process;

use distlog::{Config, DistLog, EntryFilter, EntryId, LogEntry, LogStore};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_output, Output, OutputMode};
use parse::{matches_to_action, CliAction};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let log = match open_log(&matches) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            process::exit(1);
        }
    };

    let exit_code = match matches_to_action(&matches).and_then(|action| execute(&log, action)) {
        Ok(output) => {
            let formatted = format_output(&output, output_mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            1
        }
    };

    if let Err(e) = log.flush() {
        eprintln!("{}", format_error(&format!("flush failed: {}", e), output_mode));
        process::exit(1);
    }
    process::exit(exit_code);
}

fn open_log(matches: &clap::ArgMatches) -> Result<DistLog, String> {
    let path = matches
        .get_one::<String>("db")
        .map(|s| s.as_str())
        .unwrap_or(".distlog");

    match matches.get_one::<String>("config") {
        Some(config_path) => {
            let config = Config::load(config_path)
                .map_err(|e| format!("Failed to load {}: {}", config_path, e))?;
            DistLog::open_with_config(path, &config)
        }
        None => DistLog::open(path),
    }
    .map_err(|e| format!("Failed to open {}: {}", path, e))
}

/// Run one action against the log.
pub fn execute(log: &DistLog, action: CliAction) -> Result<Output, String> {
    tracing::debug!(action = ?action, "Executing command");
    let store = log.store();
    match action {
        CliAction::List { errored, selector } => {
            let filter = EntryFilter {
                errored: errored.then_some(true),
                selector,
                ..Default::default()
            };
            store.list(&filter).map(Output::Entries).map_err(|e| e.to_string())
        }
        CliAction::Next { selector } => Ok(Output::Entry(log.queue.next_row(selector))),
        CliAction::Errored { selector } => {
            Ok(Output::Entry(log.queue.next_errored_row(selector)))
        }
        CliAction::Tag { id, tag } => {
            let entry = lookup(log, id)?;
            log.queue.append_tag(&entry, tag).map_err(|e| e.to_string())?;
            Ok(Output::Done(format!("tagged {} {}", id, tag)))
        }
        CliAction::Fail { id } => {
            let entry = lookup(log, id)?;
            log.queue.record_error(&entry).map_err(|e| e.to_string())?;
            Ok(Output::Done(format!("errored {}", id)))
        }
        CliAction::Delete { id } => {
            if store.delete(id).map_err(|e| e.to_string())? {
                Ok(Output::Done(format!("deleted {}", id)))
            } else {
                Err(format!("no entry {}", id))
            }
        }
        CliAction::Stats => log.stats().map(Output::Stats).map_err(|e| e.to_string()),
        CliAction::Compact => log.compact().map(Output::Compacted).map_err(|e| e.to_string()),
    }
}

fn lookup(log: &DistLog, id: EntryId) -> Result<LogEntry, String> {
    log.store()
        .get(id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("no entry {}", id))
}
