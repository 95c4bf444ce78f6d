//! Shared test utilities and fixtures for source fetching and loading tests

use crate::constants;
use std::fs;
use std::path::{Path, PathBuf};


/// Extra column published in the real files that the import ignores
pub const UNUSED_COLUMN: &str = "pesorake";

/// Header of a synthetic survey file
///
/// Columns are deliberately out of canonical order and include an unused
/// weighting column, as the published spreadsheets do.
pub fn survey_header(diabetes_field: &str) -> String {
    format!(
        "{},imc,cidade,ano,q6,q7,civil,q8_anos,q9,q11,q42,q45,q60,q69,q75,{}",
        UNUSED_COLUMN, diabetes_field
    )
}

/// Synthetic CSV content for one survey year
///
/// Row `i` carries age `30 + i`, so rows can be told apart after loading.
/// The first row uses sentinel codes for marital status and race.
pub fn survey_csv(year: i64, rows: usize, diabetes_field: &str) -> String {
    let mut content = survey_header(diabetes_field);
    content.push('\n');

    for i in 0..rows {
        let civil = if i == 0 { 888 } else { 2 };
        let race = if i == 0 { 777 } else { 4 };
        let sex = if i % 2 == 0 { 1 } else { 2 };
        content.push_str(&format!(
            "1.37,24.5,{},{},{},{},{},11,70.5,170,1,2,3,{},2,1\n",
            (i % 27) + 1,
            year,
            30 + i,
            sex,
            civil,
            race
        ));
    }

    content
}

/// Write a synthetic survey file named like the published ones
pub fn write_survey_file(dir: &Path, year: u16, rows: usize, diabetes_field: &str) -> PathBuf {
    let path = dir.join(constants::source_filename(
        constants::SURVEY_NAME,
        year,
        constants::CSV_EXTENSION,
    ));
    fs::write(&path, survey_csv(i64::from(year), rows, diabetes_field))
        .expect("fixture file should be writable");
    path
}
