//! Command contract and command outcome

use std::fmt;

use super::context::Context;
use crate::exitcode;

/// Error type for unexpected failures inside a command.
///
/// Expected failures are reported through [`CommandResult::Failure`] instead.
pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// A named unit of work bound to one context type.
///
/// Implementations are plain structs deriving `clap::Parser`; the clap
/// `name` and `about` attributes are the command's declared name and
/// description. A fresh instance is parsed for every invocation and
/// executed exactly once.
///
/// ```ignore
/// /// Logs a user into the client.
/// #[derive(clap::Parser)]
/// #[command(name = "login")]
/// struct Login {
///     #[arg(short, long)]
///     user: String,
/// }
///
/// impl Command<SampleContext> for Login {
///     fn execute(&mut self, ctx: &mut SampleContext) -> Result<CommandResult, CommandError> {
///         ctx.set_logged_in_user(&self.user);
///         Ok(CommandResult::Ok)
///     }
/// }
/// ```
pub trait Command<C: Context> {
    fn execute(&mut self, context: &mut C) -> Result<CommandResult, CommandError>;
}

/// Outcome of one command execution. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Ok,
    Failure { message: String, exit_code: i32 },
}

impl CommandResult {
    /// Failure with the generic failure exit code.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::failure_with_code(message, exitcode::FAILURE)
    }

    /// Failure with a specific exit code.
    ///
    /// Codes outside `1..=255` and codes the host reserves for its own
    /// failures are replaced by the generic failure code.
    pub fn failure_with_code(message: impl Into<String>, exit_code: i32) -> Self {
        Self::Failure {
            message: message.into(),
            exit_code: exitcode::command_failure(exit_code),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Ok => exitcode::OK,
            Self::Failure { exit_code, .. } => exitcode::command_failure(*exit_code),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Ok => None,
            Self::Failure { message, .. } => Some(message),
        }
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::Failure { message, .. } => {
                write!(f, "failed ({}): {message}", self.exit_code())
            }
        }
    }
}
