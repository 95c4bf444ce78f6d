//! Import run statistics

use std::time::Duration;

/// Rows committed from one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub year: u16,
    pub filename: String,
    pub rows: usize,
}

/// Outcome of a successful import run
///
/// Only produced when every configured file was committed; a failed run
/// returns its error instead.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    /// Committed files in load order
    pub files: Vec<FileSummary>,

    /// Rows inserted across all files
    pub total_rows: usize,

    /// Wall time of the run, including the store rebuild
    pub duration: Duration,
}

impl ImportSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed file
    pub fn add_file(&mut self, year: u16, filename: impl Into<String>, rows: usize) {
        self.total_rows += rows;
        self.files.push(FileSummary {
            year,
            filename: filename.into(),
            rows,
        });
    }

    /// Rows committed for `year`, if that year was loaded
    pub fn rows_for(&self, year: u16) -> Option<usize> {
        self.files.iter().find(|f| f.year == year).map(|f| f.rows)
    }

    /// Insert rate in rows per second
    pub fn rows_per_second(&self) -> f64 {
        if self.duration.is_zero() {
            0.0
        } else {
            self.total_rows as f64 / self.duration.as_secs_f64()
        }
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "Imported {} rows from {} files in {:.2}s",
            self.total_rows,
            self.files.len(),
            self.duration.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_accumulates() {
        let mut summary = ImportSummary::new();
        summary.add_file(2009, "Vigitel-2009-peso-rake.xls", 120);
        summary.add_file(2010, "Vigitel-2010-peso-rake.xls", 80);

        assert_eq!(summary.total_rows, 200);
        assert_eq!(summary.rows_for(2010), Some(80));
        assert_eq!(summary.rows_for(2011), None);
    }

    #[test]
    fn test_rows_per_second() {
        let mut summary = ImportSummary::new();
        assert_eq!(summary.rows_per_second(), 0.0);

        summary.add_file(2009, "a.csv", 50);
        summary.duration = Duration::from_secs(2);
        assert_eq!(summary.rows_per_second(), 25.0);
        assert!(summary.summary().contains("50 rows from 1 files"));
    }
}
