//! Import pipeline driver
//!
//! The loader rebuilds the destination store from scratch and then walks the
//! configured survey years in chronological order. Each year is fetched,
//! normalized and inserted before the next one starts.
//!
//! ## Commit policy
//!
//! Every source file is loaded inside its own transaction and committed once
//! after its last row. A failure while fetching, normalizing or inserting a
//! file aborts the run immediately and rolls that file's transaction back,
//! so the store holds every earlier year in full and nothing of the failing
//! year. Later years are never attempted.

pub mod stats;

#[cfg(test)]
pub mod tests;

pub use stats::{FileSummary, ImportSummary};

use crate::app::models::SourceFile;
use crate::app::services::record_normalizer::RecordNormalizer;
use crate::app::services::schema_registry::SchemaRegistry;
use crate::app::services::source_fetcher::{Origin, SourceFetcher, SpreadsheetFetcher};
use crate::app::services::survey_store::SurveyStore;
use crate::config::{Config, SourceConfig};
use crate::Result;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Drives fetch, normalization and insertion for every configured year
#[derive(Debug)]
pub struct Loader<F = SpreadsheetFetcher> {
    survey: String,
    extension: String,
    registry: SchemaRegistry,
    fetcher: F,
}

impl<F: SourceFetcher> Loader<F> {
    /// Create a loader for the given source settings
    pub fn new(source: &SourceConfig, fetcher: F) -> Result<Self> {
        let registry = SchemaRegistry::from_config(source)?;
        Ok(Self::with_registry(source, registry, fetcher))
    }

    /// Create a loader around an already built registry
    pub fn with_registry(source: &SourceConfig, registry: SchemaRegistry, fetcher: F) -> Self {
        Self {
            survey: source.survey.clone(),
            extension: source.extension.clone(),
            registry,
            fetcher,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Source files in load order
    pub fn source_files(&self) -> Vec<SourceFile> {
        self.registry
            .years()
            .map(|year| SourceFile::new(&self.survey, year, &self.extension))
            .collect()
    }

    /// Delete `destination` and import every configured year into a new store
    ///
    /// Fails fast on the first fetch, schema or storage error. See the module
    /// documentation for what the store contains afterwards.
    pub fn recreate_and_import(
        &self,
        origin: &Origin,
        destination: &Path,
    ) -> Result<ImportSummary> {
        self.recreate_and_import_with_progress(origin, destination, |_, _| {})
    }

    /// Same as [`Loader::recreate_and_import`], reporting each committed file
    /// and its row count to `on_file`
    pub fn recreate_and_import_with_progress<P>(
        &self,
        origin: &Origin,
        destination: &Path,
        mut on_file: P,
    ) -> Result<ImportSummary>
    where
        P: FnMut(&SourceFile, usize),
    {
        let start_time = Instant::now();
        info!(
            "Importing {} survey files from {} into {}",
            self.registry.years().count(),
            origin,
            destination.display()
        );

        let mut store = SurveyStore::recreate(destination)?;
        let mut summary = ImportSummary::new();

        for file in self.source_files() {
            let rows = self
                .import_file(&mut store, origin, &file)
                .map_err(|e| e.in_source_file(file.year, &file.filename))?;

            info!("Committed {} rows for {}", rows, file.year);
            on_file(&file, rows);
            summary.add_file(file.year, file.filename, rows);
        }

        store.close()?;
        summary.duration = start_time.elapsed();
        info!("{}", summary.summary());
        Ok(summary)
    }

    fn import_file(
        &self,
        store: &mut SurveyStore,
        origin: &Origin,
        file: &SourceFile,
    ) -> Result<usize> {
        debug!("Fetching {}", file.filename);
        let table = self.fetcher.fetch(origin, &file.filename)?;

        let rows = RecordNormalizer::new(&self.registry).normalize(&table, file.year)?;
        debug!("Inserting {} rows for {}", rows.len(), file.year);

        store.load_file(rows)
    }
}

/// Rebuild `destination` from the published Vigitel files under `origin`
///
/// Uses the built-in years and field mappings. Everything previously stored
/// at `destination` is deleted first.
pub fn recreate_and_import(origin: &str, destination: &Path) -> Result<ImportSummary> {
    let origin = Origin::parse(origin)?;
    let loader = Loader::new(&SourceConfig::default(), SpreadsheetFetcher::new()?)?;
    loader.recreate_and_import(&origin, destination)
}

/// Rebuild the configured destination from the configured origin
pub fn recreate_and_import_configured(config: &Config) -> Result<ImportSummary> {
    config.validate()?;
    let origin = Origin::parse(&config.source.origin)?;
    let loader = Loader::new(&config.source, SpreadsheetFetcher::new()?)?;
    loader.recreate_and_import(&origin, &config.store.destination)
}
