//! Retrieval of yearly survey files
//!
//! A fetch resolves a filename against an [`Origin`], reads the bytes over
//! HTTP or from disk, and decodes them into a polars [`DataFrame`]. There is
//! no retry and no caching: the first failure is returned to the caller as a
//! fetch error.
//!
//! ## Architecture
//!
//! - [`origin`] - Remote/local origin parsing and filename resolution
//! - [`decode`] - Workbook and CSV decoding into tabular content

pub mod decode;
pub mod origin;

#[cfg(test)]
pub mod tests;

pub use origin::Origin;

use crate::{Error, Result};
use polars::prelude::DataFrame;
use reqwest::blocking::Client;
use std::path::Path;
use tracing::{debug, info};

/// Anything able to produce one year's raw table
///
/// The loader depends on this trait rather than on a transport, so tests and
/// alternative sources can be substituted.
pub trait SourceFetcher {
    /// Retrieve and decode `filename` under `origin`
    fn fetch(&self, origin: &Origin, filename: &str) -> Result<DataFrame>;
}

/// Fetcher for published spreadsheets over HTTP(S) or from a local directory
#[derive(Debug, Clone)]
pub struct SpreadsheetFetcher {
    client: Client,
}

impl SpreadsheetFetcher {
    /// Create a fetcher with a blocking HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                Error::fetch_with_source("http client", "failed to build HTTP client", e)
            })?;
        Ok(Self { client })
    }

    /// Create a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Raw bytes of a file under the origin
    pub fn fetch_bytes(&self, origin: &Origin, filename: &str) -> Result<Vec<u8>> {
        match origin {
            Origin::Remote(base) => {
                let url = base.join(filename).map_err(|e| {
                    Error::fetch_with_source(origin.locate(filename), "invalid file URL", e)
                })?;
                self.download(url.as_str())
            }
            Origin::Local(dir) => read_local(&dir.join(filename)),
        }
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        info!("Downloading {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::fetch_with_source(url, "request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(url, format!("server responded with HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::fetch_with_source(url, "failed to read response body", e))?;

        debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

impl SourceFetcher for SpreadsheetFetcher {
    fn fetch(&self, origin: &Origin, filename: &str) -> Result<DataFrame> {
        let location = origin.locate(filename);
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| Error::fetch(&location, "filename has no extension"))?;

        let bytes = self.fetch_bytes(origin, filename)?;
        let table = decode::decode_table(bytes, extension, &location)?;

        debug!(
            "Fetched {}: {} rows x {} columns",
            location,
            table.height(),
            table.width()
        );
        Ok(table)
    }
}

fn read_local(path: &Path) -> Result<Vec<u8>> {
    let location = path.display().to_string();
    if !path.is_file() {
        return Err(Error::fetch(location, "file not found"));
    }

    info!("Reading {}", location);
    std::fs::read(path).map_err(|e| Error::fetch_with_source(location, "failed to read file", e))
}
