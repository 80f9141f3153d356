//! Property source loading
//!
//! Seeds a context store from the embedded and external property sources.
//! Load failures never abort: they are logged and the store keeps whatever
//! was loaded before.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{parse_properties, ContextStore};
use crate::infrastructure::traits::FileSystem;

/// Where a set of properties comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySource {
    /// A file read at startup.
    File(PathBuf),
    /// Text compiled into the binary, typically via `include_str!`.
    Inline {
        name: &'static str,
        content: &'static str,
    },
}

impl PropertySource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn inline(name: &'static str, content: &'static str) -> Self {
        Self::Inline { name, content }
    }
}

impl fmt::Display for PropertySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline { name, .. } => write!(f, "<inline:{name}>"),
        }
    }
}

/// What happened to one source during seeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Skipped,
    Loaded { keys: usize },
    Failed { reason: String },
}

/// Outcome of [`PropertyLoader::seed`], embedded source first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub embedded: SourceStatus,
    pub external: SourceStatus,
}

impl SeedReport {
    pub fn has_failures(&self) -> bool {
        matches!(self.embedded, SourceStatus::Failed { .. })
            || matches!(self.external, SourceStatus::Failed { .. })
    }
}

/// Service reading property sources through the filesystem boundary.
pub struct PropertyLoader {
    fs: Arc<dyn FileSystem>,
}

impl PropertyLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read and parse one source. Later duplicates within the source win.
    pub fn load(&self, source: &PropertySource) -> ApplicationResult<Vec<(String, String)>> {
        let (name, content) = match source {
            PropertySource::Inline { name, content } => (name.to_string(), (*content).to_string()),
            PropertySource::File(path) => {
                let shown = self.fs.absolute(path);
                if !self.fs.is_file(path) {
                    return Err(ApplicationError::OperationFailed {
                        context: format!("properties file not found: {}", shown.display()),
                        source: Box::new(std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "not a readable file",
                        )),
                    });
                }
                let content = self.fs.read_to_string(path).map_err(|e| {
                    ApplicationError::OperationFailed {
                        context: format!("read properties {}", shown.display()),
                        source: Box::new(e),
                    }
                })?;
                (shown.display().to_string(), content)
            }
        };

        Ok(parse_properties(&content, &name)?)
    }

    /// Load `embedded` then `external` into the store; external wins on shared keys.
    #[instrument(skip(self, store))]
    pub fn seed(
        &self,
        store: &mut ContextStore,
        embedded: Option<&PropertySource>,
        external: Option<&PropertySource>,
    ) -> SeedReport {
        let embedded = self.seed_one(store, "embedded", embedded);
        let external = self.seed_one(store, "external", external);
        SeedReport { embedded, external }
    }

    fn seed_one(
        &self,
        store: &mut ContextStore,
        role: &str,
        source: Option<&PropertySource>,
    ) -> SourceStatus {
        let Some(source) = source else {
            debug!("seed: no {} properties", role);
            return SourceStatus::Skipped;
        };
        match self.load(source) {
            Ok(pairs) => {
                let keys = pairs.len();
                store.extend(pairs);
                debug!("seed: {} properties from {}: {} entries", role, source, keys);
                SourceStatus::Loaded { keys }
            }
            Err(e) => {
                warn!("Unable to load {} properties [{}]: {}", role, source, e);
                SourceStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
