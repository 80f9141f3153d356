//! Domain layer: context store, command contract, properties format
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod command;
pub mod context;
pub mod error;
pub mod properties;
pub mod value;

pub use command::{Command, CommandError, CommandResult};
pub use context::{Context, ContextStore, HostInfo, MISSING_INT};
pub use error::DomainError;
pub use properties::parse_properties;
pub use value::Value;
