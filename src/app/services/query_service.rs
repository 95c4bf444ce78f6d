//! Read-only SQL access to a loaded store
//!
//! Queries are executed verbatim; the caller is trusted. The store is opened
//! read-only for the duration of one call, so statements that write are
//! rejected by SQLite and surface as storage errors.

use crate::app::models::Cell;
use crate::app::services::survey_store::SurveyStore;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result rows together with the column names the query produced
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Executes caller-supplied SQL against a destination store
#[derive(Debug, Clone)]
pub struct QueryService {
    destination: PathBuf,
}

impl QueryService {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Every row the query returns, columns in query order
    pub fn query(&self, sql: &str) -> Result<Vec<Vec<Cell>>> {
        Ok(self.query_with_columns(sql)?.rows)
    }

    /// Like [`QueryService::query`], also returning the result column names
    pub fn query_with_columns(&self, sql: &str) -> Result<QueryResult> {
        if sql.trim().is_empty() {
            return Err(Error::storage("query is empty", None));
        }

        let store = SurveyStore::open_existing(&self.destination, true)?;
        let conn = store.connection();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| Error::storage(format!("malformed query: {}", e), Some(e)))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt
            .query([])
            .map_err(|e| Error::storage(format!("query failed: {}", e), Some(e)))?;
        while let Some(row) = cursor.next()? {
            let cells = (0..width)
                .map(|i| row.get_ref(i).map(Cell::from))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.push(cells);
        }

        debug!(
            "Query on {} returned {} rows",
            self.destination.display(),
            rows.len()
        );
        Ok(QueryResult { columns, rows })
    }
}

/// Run `sql` against the store at `destination`
pub fn query(destination: &Path, sql: &str) -> Result<Vec<Vec<Cell>>> {
    QueryService::new(destination).query(sql)
}
