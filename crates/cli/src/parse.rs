//! ArgMatches → CliAction conversion.

use clap::ArgMatches;
use distlog::{EntryId, Selector, Tag};

/// One operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Print live entries
    List {
        errored: bool,
        selector: Option<Selector>,
    },
    /// Print the next pending entry
    Next { selector: Selector },
    /// Print an eligible errored entry
    Errored { selector: Selector },
    /// Append a tag
    Tag { id: EntryId, tag: Tag },
    /// Record a processing error
    Fail { id: EntryId },
    /// Delete an entry
    Delete { id: EntryId },
    /// Print counts
    Stats,
    /// Compact the WAL
    Compact,
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, m) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "list" => Ok(CliAction::List {
            errored: m.get_flag("errored"),
            selector: m.get_one::<String>("selector").map(|s| parse_selector(s)).transpose()?,
        }),
        "next" => Ok(CliAction::Next {
            selector: selector(m)?,
        }),
        "errored" => Ok(CliAction::Errored {
            selector: selector(m)?,
        }),
        "tag" => {
            let raw = m.get_one::<String>("tag").ok_or("Missing tag")?;
            let tag = raw.parse::<Tag>().map_err(|e| e.to_string())?;
            Ok(CliAction::Tag { id: id(m)?, tag })
        }
        "fail" => Ok(CliAction::Fail { id: id(m)? }),
        "delete" => Ok(CliAction::Delete { id: id(m)? }),
        "stats" => Ok(CliAction::Stats),
        "compact" => Ok(CliAction::Compact),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn parse_selector(raw: &str) -> Result<Selector, String> {
    raw.parse::<Selector>().map_err(|e| e.to_string())
}

fn selector(m: &ArgMatches) -> Result<Selector, String> {
    match m.get_one::<String>("selector") {
        Some(raw) => parse_selector(raw),
        None => Ok(Selector::All),
    }
}

fn id(m: &ArgMatches) -> Result<EntryId, String> {
    m.get_one::<u64>("id")
        .map(|id| EntryId::new(*id))
        .ok_or_else(|| "Missing entry id".to_string())
}
