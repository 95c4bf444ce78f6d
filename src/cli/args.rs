//! Command-line argument definitions for the Vigitel loader
//!
//! This module defines the CLI interface using the clap derive API. Every
//! flag here is an optional override: when absent, the value comes from the
//! configuration file, the environment, or the compiled-in defaults.

use crate::constants::{FIRST_SURVEY_YEAR, LAST_SURVEY_YEAR};
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the Vigitel loader
///
/// Imports the yearly Vigitel telephone survey spreadsheets into a single
/// SQLite table and runs queries against it.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vigitel-loader",
    version,
    about = "Import the yearly Vigitel survey spreadsheets into one normalized SQLite table",
    long_about = "Downloads the published Vigitel survey files (one spreadsheet per year), \
                  maps each year's columns onto a fixed fifteen-column layout and loads \
                  them into a freshly created SQLite store. Every import deletes and \
                  rebuilds the destination store."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Delete the destination store and import every configured year
    Import(ImportArgs),
    /// Run a SQL query against an imported store
    Query(QueryArgs),
    /// Show the source fields read for each survey year
    Fields(FieldsArgs),
}

/// Arguments for the import command
#[derive(Debug, Clone, Default, Parser)]
pub struct ImportArgs {
    /// Remote root URL or local directory holding the yearly files
    ///
    /// Defaults to the public Vigitel download area.
    #[arg(
        short = 'o',
        long = "origin",
        value_name = "URL|PATH",
        help = "Remote root URL or local directory holding the yearly files"
    )]
    pub origin: Option<String>,

    /// SQLite store to rebuild
    ///
    /// Any existing file at this path is deleted before the import starts.
    #[arg(
        short = 'd',
        long = "destination",
        value_name = "FILE",
        help = "SQLite store to delete and rebuild"
    )]
    pub destination: Option<PathBuf>,

    /// Source file extension, e.g. xls or csv
    #[arg(long = "extension", value_name = "EXT", help = "Source file extension")]
    pub extension: Option<String>,

    /// Survey years to import
    ///
    /// Comma-separated years or inclusive ranges, e.g. "2009-2012,2015".
    #[arg(
        short = 'y',
        long = "years",
        value_name = "LIST",
        help = "Comma-separated years or ranges to import (e.g. 2009-2012,2015)"
    )]
    pub years: Option<YearList>,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// ~/.config/vigitel-loader/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// List the files that would be imported without touching the store
    #[arg(
        long = "dry-run",
        help = "Show what would be imported without deleting or writing the store"
    )]
    pub dry_run: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the query command
#[derive(Debug, Clone, Parser)]
pub struct QueryArgs {
    /// SQL statement to execute
    #[arg(value_name = "SQL")]
    pub sql: String,

    /// SQLite store to query
    #[arg(
        short = 'd',
        long = "destination",
        value_name = "FILE",
        help = "SQLite store to query"
    )]
    pub destination: Option<PathBuf>,

    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Show coded answers with their labels and sentinel meanings
    #[arg(long = "decode", help = "Replace coded answers with their labels")]
    pub decode: bool,

    /// Output format for the result rows
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format for the result rows"
    )]
    pub output_format: OutputFormat,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Arguments for the fields command
#[derive(Debug, Clone, Parser)]
pub struct FieldsArgs {
    /// Only show one survey year
    #[arg(short = 'y', long = "year", value_name = "YEAR")]
    pub year: Option<u16>,

    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,
}

/// Output format for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for reading
    Table,
    /// CSV for further processing
    Csv,
}

/// Wrapper for parsing comma-separated year lists and ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearList {
    pub years: Vec<u16>,
}

impl FromStr for YearList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut years = Vec::new();

        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_year(start)?;
                    let end = parse_year(end)?;
                    if start > end {
                        return Err(Error::configuration(format!(
                            "Year range '{}' is reversed",
                            part
                        )));
                    }
                    years.extend(start..=end);
                }
                None => years.push(parse_year(part)?),
            }
        }

        if years.is_empty() {
            return Err(Error::configuration("Year list cannot be empty"));
        }

        years.sort_unstable();
        years.dedup();
        Ok(YearList { years })
    }
}

fn parse_year(s: &str) -> Result<u16> {
    let year: u16 = s
        .trim()
        .parse()
        .map_err(|_| Error::configuration(format!("Invalid year '{}'", s.trim())))?;

    if !(FIRST_SURVEY_YEAR..=LAST_SURVEY_YEAR).contains(&year) {
        return Err(Error::configuration(format!(
            "Year {} is outside the published range {}-{}",
            year, FIRST_SURVEY_YEAR, LAST_SURVEY_YEAR
        )));
    }
    Ok(year)
}

/// Level requested by -v/-q, or `None` to use the configured level
fn log_level(quiet: bool, verbose: u8) -> Option<&'static str> {
    if quiet {
        return Some("error");
    }
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

impl ImportArgs {
    /// Validate the import arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if let Some(destination) = &self.destination {
            if destination.is_dir() {
                return Err(Error::configuration(format!(
                    "Destination is a directory: {}",
                    destination.display()
                )));
            }
        }

        if let Some(extension) = &self.extension {
            if extension.trim().is_empty() || extension.starts_with('.') {
                return Err(Error::configuration(format!(
                    "Extension '{}' must be given without a leading dot",
                    extension
                )));
            }
        }

        Ok(())
    }

    /// Log level forced by the verbosity flags, if any
    pub fn get_log_level(&self) -> Option<&'static str> {
        log_level(self.quiet, self.verbose)
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl QueryArgs {
    /// Log level forced by the verbosity flags, if any
    pub fn get_log_level(&self) -> Option<&'static str> {
        log_level(false, self.verbose)
    }
}
