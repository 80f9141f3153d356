//! Host settings with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (external properties at `<config_dir>/<app>.properties`)
//! 2. Global config: `<config_dir>/<app>.toml`
//! 3. Environment variables: `<APP>_*` prefix (e.g. `MYAPP_PROPERTIES_FILE`)
//! 4. Command line (`--properties`), applied by the CLI layer

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::application::ApplicationError;

/// Settings of the hosting process, not of any command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// External property source; `None` disables it.
    pub properties_file: Option<PathBuf>,
    /// `tracing` filter directive used when no `-d` flag is given (e.g. "info").
    pub log_level: Option<String>,
}

/// Raw settings for intermediate parsing (every field optional).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub properties_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Get the per-user config directory for an application.
pub fn config_dir(app_name: &str) -> Option<PathBuf> {
    ProjectDirs::from("", "", app_name).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path(app_name: &str) -> Option<PathBuf> {
    config_dir(app_name).map(|dir| dir.join(format!("{app_name}.toml")))
}

/// Environment variable prefix for an application: `my-app` → `MY_APP`.
pub fn env_prefix(app_name: &str) -> String {
    app_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input as is.
fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Compiled defaults for an application.
    pub fn defaults(app_name: &str) -> Self {
        Self {
            properties_file: config_dir(app_name)
                .map(|dir| dir.join(format!("{app_name}.properties"))),
            log_level: None,
        }
    }

    /// Load settings for `app_name` from the standard locations.
    pub fn load(app_name: &str) -> Result<Self, ApplicationError> {
        Self::load_from(
            Self::defaults(app_name),
            global_config_path(app_name).as_deref(),
            &env_prefix(app_name),
        )
    }

    /// Layer an optional global TOML file and prefixed environment variables onto `base`.
    ///
    /// A missing global file is skipped; an unreadable or invalid one is an error.
    pub fn load_from(
        base: Self,
        global: Option<&Path>,
        env_prefix: &str,
    ) -> Result<Self, ApplicationError> {
        let mut current = base;

        if let Some(global_path) = global {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current, env_prefix)?;
        current.expand_paths();
        Ok(current)
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            properties_file: overlay
                .properties_file
                .clone()
                .or_else(|| self.properties_file.clone()),
            log_level: overlay
                .log_level
                .clone()
                .or_else(|| self.log_level.clone()),
        }
    }

    /// Apply `<PREFIX>_*` environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, prefix: &str) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix(prefix).prefix_separator("_"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("properties_file") {
            settings.properties_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("log_level") {
            settings.log_level = Some(val);
        }

        Ok(settings)
    }

    fn expand_paths(&mut self) {
        if let Some(path) = &self.properties_file {
            let expanded = expand_env_vars(path.to_string_lossy().as_ref());
            self.properties_file = Some(PathBuf::from(expanded));
        }
    }

    /// Generate a template config file.
    pub fn template(app_name: &str) -> String {
        format!(
            r#"# {app_name} host configuration
#
# Locations (by precedence, lowest to highest):
#   Global: <config_dir>/{app_name}.toml
#   Env:    {prefix}_* environment variables
#   CLI:    --properties <file>

# External properties file, overrides the embedded defaults
# properties_file = "~/.config/{app_name}/{app_name}.properties"

# Log filter when no -d flag is given
# log_level = "info"
"#,
            prefix = env_prefix(app_name)
        )
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
