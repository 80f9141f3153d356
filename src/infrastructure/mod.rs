//! Infrastructure layer: I/O implementations
//!
//! This layer implements I/O boundary traits used by the application services.

pub mod traits;

pub use traits::{FileSystem, RealFileSystem};
