//! Host-level argument definitions using clap
//!
//! Only the host's own flags are parsed here. The first positional token is
//! the command name; it and everything after it are captured raw and handed
//! to that command's parser.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand, ValueHint};

use crate::domain::HostInfo;

#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(allow_external_subcommands = true, disable_help_subcommand = true)]
pub struct HostArgs {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// External properties file (overrides configured location)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub properties: Option<PathBuf>,

    /// Print a host configuration template and exit
    #[arg(long)]
    pub config_template: bool,

    #[command(subcommand)]
    pub invocation: Option<Invocation>,
}

/// Command name followed by its unparsed arguments.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Invocation {
    #[command(external_subcommand)]
    Command(Vec<String>),
}

impl HostArgs {
    /// Parse host arguments, naming the clap command after the application.
    pub fn try_parse_for<I, T>(info: &HostInfo, argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = Self::command().name(info.name.clone());
        if !info.version.is_empty() {
            command = command.version(info.version.clone());
        }
        if !info.description.is_empty() {
            command = command.about(info.description.clone());
        }
        command = command.after_help(format!(
            "Run '{} help' to list the available commands.",
            info.name
        ));
        let matches = command.try_get_matches_from(argv)?;
        Self::from_arg_matches(&matches)
    }

    /// Name of the command to run, if any.
    pub fn command_name(&self) -> Option<&str> {
        match &self.invocation {
            Some(Invocation::Command(tokens)) => tokens.first().map(String::as_str),
            None => None,
        }
    }

    /// Arguments following the command name.
    pub fn command_args(&self) -> &[String] {
        match &self.invocation {
            Some(Invocation::Command(tokens)) if !tokens.is_empty() => &tokens[1..],
            _ => &[],
        }
    }
}
