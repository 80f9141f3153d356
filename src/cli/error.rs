//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Anything that kept the application from becoming ready.
    #[error("startup failed: {0}")]
    Startup(ApplicationError),

    /// Host arguments rejected by clap (or help/version display).
    #[error("{0}")]
    HostArgs(clap::Error),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Startup(_) => crate::exitcode::CONFIG,
            CliError::HostArgs(e) => clap_exit_code(e),
            CliError::Application(e) => match e {
                ApplicationError::UnknownCommand { .. } => crate::exitcode::UNKNOWN_COMMAND,
                ApplicationError::Arguments(e) => clap_exit_code(e),
                ApplicationError::CommandAborted { .. } => crate::exitcode::SOFTWARE,
                ApplicationError::InvalidState { .. } => crate::exitcode::SOFTWARE,
                ApplicationError::Domain(DomainError::TypeMismatch { .. }) => {
                    crate::exitcode::SOFTWARE
                }
                ApplicationError::OperationFailed { .. } => crate::exitcode::SOFTWARE,
                ApplicationError::Domain(_)
                | ApplicationError::Config { .. }
                | ApplicationError::Startup { .. } => crate::exitcode::CONFIG,
            },
        }
    }
}

/// Help and version requests are not errors.
fn clap_exit_code(e: &clap::Error) -> i32 {
    if e.use_stderr() {
        crate::exitcode::USAGE
    } else {
        crate::exitcode::OK
    }
}
