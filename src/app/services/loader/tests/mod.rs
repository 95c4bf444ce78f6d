//! Shared test utilities and fixtures for loader tests

use crate::app::services::source_fetcher::decode::decode_csv;
use crate::app::services::source_fetcher::tests::survey_csv;
use crate::app::services::source_fetcher::{Origin, SourceFetcher};
use crate::config::{FieldOverride, SourceConfig};
use crate::constants;
use crate::{Error, Result};
use polars::prelude::DataFrame;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

pub mod loader_tests;

/// Fetcher serving pre-built tables by filename
///
/// Filenames without a table fail like a missing remote file. Every request
/// is recorded so tests can check which years were attempted.
#[derive(Debug, Default)]
pub struct InMemoryFetcher {
    tables: HashMap<String, DataFrame>,
    requests: RefCell<Vec<String>>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a synthetic table for `year` under its csv filename
    pub fn with_year(mut self, year: u16, rows: usize, diabetes_field: &str) -> Self {
        let filename = csv_filename(year);
        let table = decode_csv(
            survey_csv(i64::from(year), rows, diabetes_field).into_bytes(),
            &filename,
        )
        .expect("synthetic csv should decode");
        self.tables.insert(filename, table);
        self
    }

    /// Serve an arbitrary table
    pub fn with_table(mut self, year: u16, table: DataFrame) -> Self {
        self.tables.insert(csv_filename(year), table);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl SourceFetcher for InMemoryFetcher {
    fn fetch(&self, origin: &Origin, filename: &str) -> Result<DataFrame> {
        self.requests.borrow_mut().push(filename.to_string());
        self.tables
            .get(filename)
            .cloned()
            .ok_or_else(|| {
                Error::fetch(
                    origin.locate(filename),
                    "server responded with HTTP 404 Not Found",
                )
            })
    }
}

pub fn csv_filename(year: u16) -> String {
    constants::source_filename(constants::SURVEY_NAME, year, constants::CSV_EXTENSION)
}

/// Source settings for csv files under `origin`
///
/// Keeps the renamed diabetes field for 2014 so that year can be exercised.
pub fn csv_source(origin: &Path, years: &[u16]) -> SourceConfig {
    SourceConfig {
        origin: origin.display().to_string(),
        extension: constants::CSV_EXTENSION.to_string(),
        years: years.to_vec(),
        field_overrides: years
            .iter()
            .filter(|&&year| year == constants::DIABETES_RENAMED_YEAR)
            .map(|&year| FieldOverride {
                year,
                field: crate::CanonicalField::Diabetes,
                source: constants::DIABETES_ALTERNATE_FIELD.to_string(),
            })
            .collect(),
        ..SourceConfig::default()
    }
}
