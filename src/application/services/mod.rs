//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod properties;

pub use properties::{PropertyLoader, PropertySource, SeedReport, SourceStatus};
