//! Decoding fetched bytes into tabular content
//!
//! Workbooks are read from their first worksheet with the first row as
//! headers. Each column keeps the widest native type found in it: integer,
//! then real, then text. Whole numbers count as integers, since workbook
//! formats store every number as a float. Empty and error cells become nulls.
//!
//! Repeated headers are renamed `<name>_duplicated_<n>`, as the CSV reader
//! does, so a stray copy of a column the import ignores does not fail the file.

use crate::constants::{CSV_EXTENSION, DUPLICATE_HEADER_SUFFIX, WORKBOOK_EXTENSIONS};
use crate::{Error, Result};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use tracing::debug;

static EMPTY_CELL: Data = Data::Empty;

/// Decode a fetched file according to its extension
pub fn decode_table(bytes: Vec<u8>, extension: &str, location: &str) -> Result<DataFrame> {
    let extension = extension.to_ascii_lowercase();

    if extension == CSV_EXTENSION {
        decode_csv(bytes, location)
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        decode_workbook(bytes, location)
    } else {
        Err(Error::fetch(
            location,
            format!("unsupported source format '.{}'", extension),
        ))
    }
}

/// Decode delimited text with a header row
pub fn decode_csv(bytes: Vec<u8>, location: &str) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| Error::fetch_with_source(location, "unreadable CSV content", e))
}

/// Decode the first worksheet of an xls/xlsx/xlsb/ods workbook
pub fn decode_workbook(bytes: Vec<u8>, location: &str) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| Error::fetch_with_source(location, "unreadable workbook", e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::fetch(location, "workbook has no worksheets"))?
        .map_err(|e| Error::fetch_with_source(location, "unreadable worksheet", e))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| Error::fetch(location, "worksheet is empty"))?;
    let headers = header_names(header_row);
    let body: Vec<&[Data]> = rows.collect();

    debug!(
        "Decoded worksheet from {}: {} columns, {} rows",
        location,
        headers.len(),
        body.len()
    );

    let columns = headers
        .iter()
        .enumerate()
        .map(|(index, name)| {
            build_column(name, body.iter().map(|row| row.get(index).unwrap_or(&EMPTY_CELL)))
        })
        .collect();

    DataFrame::new(columns)
        .map_err(|e| Error::fetch_with_source(location, "inconsistent worksheet layout", e))
}

fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut repeats: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(row.len());

    for (index, cell) in row.iter().enumerate() {
        let name = match cell {
            Data::String(text) => text.trim().to_string(),
            Data::Empty => String::new(),
            other => other.to_string(),
        };
        let mut name = if name.is_empty() {
            format!("column_{}", index + 1)
        } else {
            name
        };
        if seen.contains(&name) {
            let base = name;
            let counter = repeats.entry(base.clone()).or_insert(0);
            loop {
                name = format!("{}{}{}", base, DUPLICATE_HEADER_SUFFIX, counter);
                *counter += 1;
                if !seen.contains(&name) {
                    break;
                }
            }
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum NativeKind {
    Integer,
    Real,
    Text,
}

fn cell_kind(cell: &Data) -> Option<NativeKind> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::Int(_) | Data::Bool(_) => Some(NativeKind::Integer),
        Data::Float(v) if is_whole(*v) => Some(NativeKind::Integer),
        Data::Float(_) | Data::DateTime(_) => Some(NativeKind::Real),
        Data::String(_) | Data::DateTimeIso(_) | Data::DurationIso(_) => Some(NativeKind::Text),
    }
}

fn is_whole(value: f64) -> bool {
    value.fract() == 0.0 && value.abs() < i64::MAX as f64
}

fn build_column<'a>(name: &str, cells: impl Iterator<Item = &'a Data> + Clone) -> Column {
    let kind = cells
        .clone()
        .filter_map(cell_kind)
        .max()
        .unwrap_or(NativeKind::Real);

    match kind {
        NativeKind::Integer => {
            let values: Vec<Option<i64>> = cells
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v),
                    Data::Float(v) => Some(*v as i64),
                    Data::Bool(v) => Some(i64::from(*v)),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), values)
        }
        NativeKind::Real => {
            let values: Vec<Option<f64>> = cells
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v as f64),
                    Data::Float(v) => Some(*v),
                    Data::Bool(v) => Some(f64::from(u8::from(*v))),
                    Data::DateTime(v) => Some(v.as_f64()),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), values)
        }
        NativeKind::Text => {
            let values: Vec<Option<String>> = cells
                .map(|cell| match cell {
                    Data::Empty | Data::Error(_) => None,
                    Data::String(v) => Some(v.clone()),
                    other => Some(other.to_string()),
                })
                .collect();
            Column::new(name.into(), values)
        }
    }
}
