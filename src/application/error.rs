//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("unknown command [{name}]")]
    UnknownCommand { name: String, known: Vec<String> },

    /// Argument parser rejected the command arguments (or displayed help).
    #[error("{0}")]
    Arguments(#[from] clap::Error),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("startup failed: {message}")]
    Startup { message: String },

    #[error("host is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("command [{command}] failed unexpectedly: {message}")]
    CommandAborted { command: String, message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
