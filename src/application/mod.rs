//! Application layer: registry, host and services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod host;
pub mod registry;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use host::{Application, Host, HostState, ShutdownError};
pub use registry::{CommandCatalog, CommandEntry, CommandRegistry, HELP_COMMAND};
pub use services::{PropertyLoader, PropertySource, SeedReport, SourceStatus};
