//! cmdhost: a small framework for command-line applications
//!
//! An [`Application`](application::Application) declares its commands and a
//! context factory. The [`Host`](application::Host) seeds a
//! [`ContextStore`](domain::ContextStore) from embedded and external property
//! sources, builds the command registry, resolves the command named on the
//! command line, lets clap populate a fresh instance and executes it.
//!
//! # Architecture
//!
//! - `domain`: context store, command contract, properties format
//! - `application`: registry, host lifecycle, property loading
//! - `infrastructure`: I/O boundary traits and implementations
//! - `cli`: host arguments, dispatch, exit codes, terminal output
//! - `config`: layered host settings

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{Application, CommandCatalog, Host, PropertySource};
pub use domain::{Command, CommandError, CommandResult, Context, ContextStore, HostInfo, Value};
