//! Command registry.
//!
//! A static table maps verb paths ("room create", "ping", ...) to an option
//! schema and a typed command value. Resolution walks the table for the
//! deepest path matching the leading tokens, then parses the remaining
//! tokens against that entry's clap schema. The built-ins `help` and `quit`
//! never reach the registry; the orchestrator handles them first.

use std::fmt::Write as _;

use clap::{ArgAction, CommandFactory, Parser};
use muster_coordination::RoomId;
use thiserror::Error;

/// Options for `room create`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "room create", no_binary_name = true)]
pub struct RoomCreateOpts {
    /// Display name for the new room
    #[arg(long, default_value = "muster room")]
    pub name: String,

    /// Enable detailed output
    #[arg(long, short)]
    pub verbose: bool,
}

/// Options for `room join`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "room join", no_binary_name = true)]
pub struct RoomJoinOpts {
    /// Room to join
    #[arg(long)]
    pub id: RoomId,

    /// Enable detailed output
    #[arg(long, short)]
    pub verbose: bool,
}

/// Options for `room list`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "room list", no_binary_name = true)]
pub struct RoomListOpts {
    /// Restrict the listing to one application
    #[arg(long = "applicationId")]
    pub application_id: Option<u64>,

    /// Upper bound on returned rooms
    #[arg(long = "maximumCount", default_value_t = 16)]
    pub maximum_count: u32,
}

/// Options for `ping`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "ping", no_binary_name = true)]
pub struct PingOpts {
    /// Simulation tick id the client has knowledge of
    #[arg(long, short, default_value_t = 0)]
    pub knowledge: u64,

    /// Enable detailed output
    #[arg(long, short)]
    pub verbose: bool,
}

/// Options for `state` (none).
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "state", no_binary_name = true)]
pub struct StateOpts {}

/// A resolved command with its parsed options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a room.
    RoomCreate(RoomCreateOpts),
    /// Join a room.
    RoomJoin(RoomJoinOpts),
    /// List rooms.
    RoomList(RoomListOpts),
    /// Show session state.
    State,
    /// Ping the coordinator.
    Ping(PingOpts),
}

/// One registry entry: a verb path, its option schema and its parser.
pub struct CommandSpec {
    /// Verb tokens, matched against the leading input tokens.
    pub path: &'static [&'static str],
    /// One-line description shown in the help tree.
    pub about: &'static str,
    parse: fn(&[String]) -> Result<Command, clap::Error>,
    schema: fn() -> clap::Command,
}

/// The command table. Immutable after program start.
pub const REGISTRY: &[CommandSpec] = &[
    CommandSpec {
        path: &["room", "create"],
        about: "Create a room on the coordinator",
        parse: |rest: &[String]| RoomCreateOpts::try_parse_from(rest).map(Command::RoomCreate),
        schema: RoomCreateOpts::command,
    },
    CommandSpec {
        path: &["room", "join"],
        about: "Join an existing room",
        parse: |rest: &[String]| RoomJoinOpts::try_parse_from(rest).map(Command::RoomJoin),
        schema: RoomJoinOpts::command,
    },
    CommandSpec {
        path: &["room", "list"],
        about: "List rooms on the coordinator",
        parse: |rest: &[String]| RoomListOpts::try_parse_from(rest).map(Command::RoomList),
        schema: RoomListOpts::command,
    },
    CommandSpec {
        path: &["state"],
        about: "Show identity and coordination session state",
        parse: |rest: &[String]| StateOpts::try_parse_from(rest).map(|_| Command::State),
        schema: StateOpts::command,
    },
    CommandSpec {
        path: &["ping"],
        about: "Ping the coordinator",
        parse: |rest: &[String]| PingOpts::try_parse_from(rest).map(Command::Ping),
        schema: PingOpts::command,
    },
];

/// Dispatch failures. Each carries a stable negative result code that is
/// included in the printed diagnostic.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No registry path matches the leading tokens.
    #[error("unknown command '{verb}'")]
    UnknownCommand {
        /// First input token, for the diagnostic.
        verb: String,
    },

    /// The line could not be split into tokens.
    #[error("unreadable command line: {0}")]
    Tokenize(#[from] shell_words::ParseError),

    /// Tokens after the verb path did not parse against the option schema.
    #[error("{path}: {message}")]
    BadOptions {
        /// Verb path of the entry that rejected the options.
        path: String,
        /// Parser message.
        message: String,
    },
}

impl DispatchError {
    /// Negative result code for diagnostics.
    pub fn code(&self) -> i32 {
        match self {
            DispatchError::UnknownCommand { .. } => -1,
            DispatchError::Tokenize(_) => -2,
            DispatchError::BadOptions { .. } => -3,
        }
    }
}

/// Resolve one input line into a typed command.
///
/// Exactly one of: a command, or an error; resolution itself never has side
/// effects.
pub fn resolve(line: &str) -> Result<Command, DispatchError> {
    let tokens = shell_words::split(line)?;
    let spec = REGISTRY
        .iter()
        .filter(|spec| {
            spec.path.len() <= tokens.len()
                && spec.path.iter().zip(tokens.iter()).all(|(p, t)| t.as_str() == *p)
        })
        .max_by_key(|spec| spec.path.len())
        .ok_or_else(|| DispatchError::UnknownCommand {
            verb: tokens.first().cloned().unwrap_or_default(),
        })?;

    (spec.parse)(&tokens[spec.path.len()..]).map_err(|e| DispatchError::BadOptions {
        path: spec.path.join(" "),
        message: e.to_string(),
    })
}

/// Render the full command tree: paths, descriptions and per-option help.
pub fn render_help(out: &mut String) {
    let _ = writeln!(out, "commands:");
    for spec in REGISTRY {
        let _ = writeln!(out, "  {:<12} {}", spec.path.join(" "), spec.about);
        let schema = (spec.schema)();
        for arg in schema.get_arguments() {
            if arg.get_id().as_str() == "help" {
                continue;
            }
            let mut flags = String::new();
            if let Some(short) = arg.get_short() {
                let _ = write!(flags, "-{short}, ");
            }
            if let Some(long) = arg.get_long() {
                let _ = write!(flags, "--{long}");
            }
            if matches!(arg.get_action(), ArgAction::Set) {
                let _ = write!(flags, " <{}>", arg.get_id().as_str().to_uppercase());
            }
            let help = arg.get_help().map(ToString::to_string).unwrap_or_default();
            let _ = writeln!(out, "      {flags:<26} {help}");
        }
    }
    let _ = writeln!(out, "  {:<12} Show this command tree", "help");
    let _ = writeln!(out, "  {:<12} Leave the program", "quit");
}
