//! Application constants for the Vigitel loader
//!
//! This module contains the compiled-in defaults: where the survey files live,
//! how they are named, which years exist, and what the destination table is
//! called.

// =============================================================================
// Source Files
// =============================================================================

/// Public download root of the Ministry of Health survey files
pub const DEFAULT_ORIGIN: &str = "http://svs.aids.gov.br/download/Vigitel/";

/// Survey name used as the first segment of every source filename
pub const SURVEY_NAME: &str = "Vigitel";

/// Filename segment after the year (`<Survey>-<year>-peso-rake.<ext>`)
pub const FILE_SUFFIX: &str = "peso-rake";

/// Extension of the published spreadsheets
pub const DEFAULT_EXTENSION: &str = "xls";

/// First survey year published in the fixed enumeration
pub const FIRST_SURVEY_YEAR: u16 = 2009;

/// Last survey year published in the fixed enumeration
pub const LAST_SURVEY_YEAR: u16 = 2019;

/// Extensions decoded as workbooks
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// Extension decoded as delimited text
pub const CSV_EXTENSION: &str = "csv";

/// Suffix given to repeated source headers, followed by a counter
pub const DUPLICATE_HEADER_SUFFIX: &str = "_duplicated_";

// =============================================================================
// Schema Drift
// =============================================================================

/// The year whose spreadsheet publishes the diabetes question as `q76a`
pub const DIABETES_RENAMED_YEAR: u16 = 2014;

/// Alternate diabetes field name used in [`DIABETES_RENAMED_YEAR`]
pub const DIABETES_ALTERNATE_FIELD: &str = "q76a";

// =============================================================================
// Destination Store
// =============================================================================

/// Default SQLite file written by an import run
pub const DEFAULT_DESTINATION: &str = "DB_VIGITEL.db";

/// Name of the single destination table
pub const TABLE_NAME: &str = "VIGITEL";

/// Surrogate key column, generated by SQLite
pub const ID_COLUMN: &str = "ID";

/// Number of data columns, excluding the surrogate key
pub const CANONICAL_ARITY: usize = 15;

// =============================================================================
// Configuration
// =============================================================================

/// Environment variable overriding the source origin
pub const ENV_ORIGIN: &str = "VIGITEL_ORIGIN";

/// Environment variable overriding the destination store
pub const ENV_DESTINATION: &str = "VIGITEL_DESTINATION";

/// Directory name under the user config dir holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "vigitel-loader";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default log level when neither RUST_LOG nor -v/-q is given
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Levels accepted in the `[logging]` section
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Build the filename for a survey year, e.g. `Vigitel-2014-peso-rake.xls`
pub fn source_filename(survey: &str, year: u16, extension: &str) -> String {
    format!("{}-{}-{}.{}", survey, year, FILE_SUFFIX, extension)
}

/// All years in the published enumeration
pub fn survey_years() -> Vec<u16> {
    (FIRST_SURVEY_YEAR..=LAST_SURVEY_YEAR).collect()
}
