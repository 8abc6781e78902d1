//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/sdata/sdata.toml`
//! 3. Local config: `<project_dir>/.sdata.toml`
//! 4. Environment variables: `SDATA_*` prefix (`__` separates nested keys)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Default schema directory, relative to the project directory.
pub const DEFAULT_SCHEMA_DIR: &str = "config/structured-data";

/// Output rendering for extraction results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON document
    #[default]
    Json,
    /// Indented text tree
    Tree,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "tree" => Ok(Self::Tree),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    /// Default format for `extract`
    pub format: OutputFormat,
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

/// Raw output settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputSettings {
    pub format: Option<OutputFormat>,
    pub pretty: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub schema_dir: Option<PathBuf>,
    #[serde(default)]
    pub output: RawOutputSettings,
}

/// Unified configuration for sdata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding schema documents (default: config/structured-data)
    pub schema_dir: PathBuf,
    /// Output settings
    pub output: OutputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from(DEFAULT_SCHEMA_DIR),
            output: OutputSettings::default(),
        }
    }
}

/// Get the XDG config directory for sdata.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sdata").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("sdata.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".sdata.toml")
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

/// Expand `~`, `$VAR` and `${VAR}` in a path-like string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields, then anchor a
    /// relative schema directory at the project directory.
    fn expand_paths(&mut self, project_dir: Option<&Path>) {
        let expanded = expand_env_vars(self.schema_dir.to_string_lossy().as_ref());
        self.schema_dir = PathBuf::from(expanded);

        if let Some(project) = project_dir {
            if self.schema_dir.is_relative() {
                self.schema_dir = project.join(&self.schema_dir);
            }
        }
    }

    /// Merge overlay config onto self (base): overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            schema_dir: overlay
                .schema_dir
                .clone()
                .unwrap_or_else(|| self.schema_dir.clone()),
            output: OutputSettings {
                format: overlay.output.format.unwrap_or(self.output.format),
                pretty: overlay.output.pretty.unwrap_or(self.output.pretty),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config and for
    ///   resolving a relative `schema_dir`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Project-local config
        if let Some(project) = project_dir {
            let local_path = local_config_path(project);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths(project_dir);

        Ok(current)
    }

    /// Apply SDATA_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("SDATA")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("schema_dir") {
            settings.schema_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("output.format") {
            settings.output.format = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_bool("output.pretty") {
            settings.output.pretty = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# sdata configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/sdata/sdata.toml   (your baseline)
#   Local:  <project_dir>/.sdata.toml    (project-specific overrides)
#   Env:    SDATA_* environment variables (explicit overrides,
#           e.g. SDATA_SCHEMA_DIR, SDATA_OUTPUT__PRETTY)

# Directory holding <name>.json / <name>.toml schema documents.
# Relative paths are resolved against the project directory.
# schema_dir = "config/structured-data"

[output]
# Default output format for `sdata extract`: "json" or "tree"
# format = "json"

# Pretty-print JSON output
# pretty = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
