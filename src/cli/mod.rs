//! CLI layer: host argument parsing, dispatch and terminal output

pub mod args;
pub mod error;
pub mod logging;
pub mod output;
pub mod runner;

pub use args::{HostArgs, Invocation};
pub use error::{CliError, CliResult};
pub use runner::{run, run_with_settings};
