//! Configuration management and validation.
//!
//! Configuration is resolved once at startup, layered as compiled-in
//! defaults, then an optional TOML file, then environment variables, then
//! command-line flags. The resulting [`Config`] is immutable for the rest of
//! the run and is handed explicitly to the registry and loader.

use crate::app::models::CanonicalField;
use crate::constants;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Replaces the standard source name of one field in one survey year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOverride {
    pub year: u16,
    pub field: CanonicalField,
    pub source: String,
}

/// Where the yearly files come from and how they are named
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Remote root URL or local directory holding the yearly files
    pub origin: String,

    /// First filename segment, e.g. "Vigitel"
    pub survey: String,

    /// File extension, e.g. "xls"
    pub extension: String,

    /// Years to import, in load order
    pub years: Vec<u16>,

    /// Per-year source name substitutions
    pub field_overrides: Vec<FieldOverride>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            origin: constants::DEFAULT_ORIGIN.to_string(),
            survey: constants::SURVEY_NAME.to_string(),
            extension: constants::DEFAULT_EXTENSION.to_string(),
            years: constants::survey_years(),
            field_overrides: vec![FieldOverride {
                year: constants::DIABETES_RENAMED_YEAR,
                field: CanonicalField::Diabetes,
                source: constants::DIABETES_ALTERNATE_FIELD.to_string(),
            }],
        }
    }
}

/// Destination store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file that is deleted and rebuilt by every import
    pub destination: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from(constants::DEFAULT_DESTINATION),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: constants::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Complete configuration for an import or query run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Default location of the configuration file
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))?;
        Ok(config_dir
            .join(constants::CONFIG_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME))
    }

    /// Parse a configuration from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Invalid configuration file: {}", e)))
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        Self::from_toml_str(&content)
    }

    /// Load defaults, then the optional file, then environment overrides
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `VIGITEL_ORIGIN` / `VIGITEL_DESTINATION` style overrides
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(origin) = lookup(constants::ENV_ORIGIN).filter(|v| !v.trim().is_empty()) {
            debug!("Origin overridden from environment: {}", origin);
            self.source.origin = origin;
        }
        if let Some(dest) = lookup(constants::ENV_DESTINATION).filter(|v| !v.trim().is_empty()) {
            debug!("Destination overridden from environment: {}", dest);
            self.store.destination = PathBuf::from(dest);
        }
    }

    /// Check internal consistency before any destructive work starts
    pub fn validate(&self) -> Result<()> {
        if self.source.origin.trim().is_empty() {
            return Err(Error::configuration("Source origin must not be empty"));
        }
        if self.source.survey.trim().is_empty() {
            return Err(Error::configuration("Survey name must not be empty"));
        }
        if self.source.extension.trim().is_empty() {
            return Err(Error::configuration("File extension must not be empty"));
        }
        if self.source.years.is_empty() {
            return Err(Error::configuration("At least one survey year is required"));
        }

        let mut seen = HashSet::new();
        for year in &self.source.years {
            if !seen.insert(*year) {
                return Err(Error::configuration(format!(
                    "Survey year {} is listed more than once",
                    year
                )));
            }
        }

        for field_override in &self.source.field_overrides {
            if !seen.contains(&field_override.year) {
                return Err(Error::configuration(format!(
                    "Field override for {} targets unregistered year {}",
                    field_override.field, field_override.year
                )));
            }
            if field_override.source.trim().is_empty() {
                return Err(Error::configuration(format!(
                    "Field override for {} in {} has an empty source name",
                    field_override.field, field_override.year
                )));
            }
        }

        if self.store.destination.as_os_str().is_empty() {
            return Err(Error::configuration("Destination store path must not be empty"));
        }

        if !constants::LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::configuration(format!(
                "Unknown log level '{}', expected one of: {}",
                self.logging.level,
                constants::LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
