//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent contract violations on the core types.
/// These are independent of I/O and CLI concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("value [{value}] associated with key [{key}] is not of type {expected}")]
    TypeMismatch {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("malformed properties in {source_name} at line {line}: {message}")]
    MalformedProperties {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("invalid command name [{name}] declared by {type_path}: {reason}")]
    InvalidCommandName {
        name: String,
        type_path: String,
        reason: String,
    },

    #[error("duplicate command name [{name}]: declared by {first} and {second}")]
    DuplicateCommand {
        name: String,
        first: String,
        second: String,
    },
}
