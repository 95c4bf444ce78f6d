//! Vigitel Loader Library
//!
//! A Rust library for importing the yearly Vigitel telephone survey
//! spreadsheets into a single normalized SQLite table.
//!
//! This library provides tools for:
//! - Resolving each survey year's source columns onto one canonical schema
//! - Fetching yearly spreadsheets from a remote root or a local directory
//! - Projecting fetched sheets onto the canonical column order
//! - Rebuilding the destination store with one transaction per source file
//! - Running read-only SQL against the loaded store

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod loader;
        pub mod query_service;
        pub mod record_normalizer;
        pub mod schema_registry;
        pub mod source_fetcher;
        pub mod survey_store;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CanonicalField, Cell, SurveyRecord};
pub use app::services::loader::{ImportSummary, Loader, recreate_and_import};
pub use app::services::query_service::{QueryService, query};
pub use app::services::schema_registry::SchemaRegistry;
pub use app::services::source_fetcher::{Origin, SourceFetcher, SpreadsheetFetcher};
pub use config::Config;

/// Result type alias for the Vigitel loader
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the import pipeline and query service
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Source unreachable, missing, or unreadable
    #[error("Fetch error for '{location}': {message}")]
    Fetch {
        location: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A year's field list is unresolvable or incomplete
    #[error("Schema error{}: {message}", .year.map(|y| format!(" (year {y})")).unwrap_or_default())]
    Schema { year: Option<u16>, message: String },

    /// Destination store unavailable, malformed query, or failed write
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a fetch error without an underlying cause
    pub fn fetch(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            location: location.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a fetch error wrapping the transport or decoder failure
    pub fn fetch_with_source(
        location: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Fetch {
            location: location.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a schema error not tied to a particular year
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            year: None,
            message: message.into(),
        }
    }

    /// Create a schema error for a survey year
    pub fn schema_for_year(year: u16, message: impl Into<String>) -> Self {
        Self::Schema {
            year: Some(year),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>, source: Option<rusqlite::Error>) -> Self {
        Self::Storage {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Attach the survey year and source file to an error raised while loading it
    ///
    /// Variants keep their kind so callers can still match on fetch, schema
    /// and storage failures.
    pub fn in_source_file(self, year: u16, filename: &str) -> Self {
        match self {
            Self::Fetch {
                location,
                message,
                source,
            } => Self::Fetch {
                location,
                message: format!("{message} (year {year}, file {filename})"),
                source,
            },
            Self::Schema { message, .. } => Self::Schema {
                year: Some(year),
                message: format!("{message} (file {filename})"),
            },
            Self::Storage { message, source } => Self::Storage {
                message: format!("{message} (year {year}, file {filename})"),
                source,
            },
            other => other,
        }
    }

    /// True for fetch failures
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// True for schema failures
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    /// True for storage failures
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::Storage {
            message: error.to_string(),
            source: Some(error),
        }
    }
}
