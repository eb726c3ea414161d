//! clap command tree.

use clap::{Arg, ArgAction, Command};

fn selector_arg() -> Arg {
    Arg::new("selector")
        .long("selector")
        .short('s')
        .value_parser(["all", "source"])
        .default_value("all")
        .help("Consumer stage whose view to use")
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(clap::value_parser!(u64))
        .help("Log entry id")
}

/// Build the top-level `distlog` command.
pub fn build_cli() -> Command {
    Command::new("distlog")
        .about("Inspect and operate a distlog change log")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("db")
                .long("db")
                .short('d')
                .global(true)
                .default_value(".distlog")
                .help("Database directory"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML config file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print JSON instead of text"),
        )
        .subcommand(
            Command::new("list")
                .about("List live entries, oldest first")
                .arg(
                    Arg::new("errored")
                        .long("errored")
                        .action(ArgAction::SetTrue)
                        .help("Only quarantined entries"),
                )
                .arg(selector_arg().default_value(None::<&str>)),
        )
        .subcommand(
            Command::new("next")
                .about("Show the entry next_row would return")
                .arg(selector_arg()),
        )
        .subcommand(
            Command::new("errored")
                .about("Pick an errored entry whose cooldown has passed")
                .arg(selector_arg()),
        )
        .subcommand(
            Command::new("tag")
                .about("Append a tag to an entry")
                .arg(id_arg())
                .arg(
                    Arg::new("tag")
                        .required(true)
                        .value_parser(["event", "source", "batch"]),
                ),
        )
        .subcommand(
            Command::new("fail")
                .about("Record a processing error on an entry")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete (claim) an entry")
                .arg(id_arg()),
        )
        .subcommand(Command::new("stats").about("Show row counts"))
        .subcommand(Command::new("compact").about("Rewrite the WAL down to live rows"))
}
