//! Projection of fetched tables onto the canonical record layout
//!
//! The normalizer keeps exactly the registered source columns of a year, in
//! registry order, and hands them out one [`SurveyRecord`] at a time. Values
//! are passed through with the type the source format gave them; nothing is
//! range-checked and sentinel codes are left alone.

use crate::app::models::{Cell, SurveyRecord};
use crate::app::services::schema_registry::SchemaRegistry;
use crate::constants::{CANONICAL_ARITY, DUPLICATE_HEADER_SUFFIX};
use crate::{Error, Result};
use polars::prelude::*;
use tracing::debug;

/// Normalizes tables using the field lists of a [`SchemaRegistry`]
#[derive(Debug, Clone, Copy)]
pub struct RecordNormalizer<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Normalize one year's table
    pub fn normalize(&self, table: &DataFrame, year: u16) -> Result<NormalizedRows> {
        let fields = self.registry.fields_for(year)?;
        project(table, fields, year)
    }
}

/// Restrict `table` to `fields`, in that order
///
/// Fails with a schema error naming every registered field the table lacks,
/// or every registered field whose header the source repeats.
pub fn project(table: &DataFrame, fields: &[String], year: u16) -> Result<NormalizedRows> {
    if fields.len() != CANONICAL_ARITY {
        return Err(Error::schema_for_year(
            year,
            format!(
                "field list has {} entries, expected {}",
                fields.len(),
                CANONICAL_ARITY
            ),
        ));
    }

    let missing: Vec<&str> = fields
        .iter()
        .map(String::as_str)
        .filter(|name| table.get_column_index(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(Error::schema_for_year(
            year,
            format!("source is missing registered fields: {}", missing.join(", ")),
        ));
    }

    let ambiguous: Vec<&str> = fields
        .iter()
        .map(String::as_str)
        .filter(|name| is_repeated(table, name))
        .collect();
    if !ambiguous.is_empty() {
        return Err(Error::schema_for_year(
            year,
            format!("source repeats registered fields: {}", ambiguous.join(", ")),
        ));
    }

    let projected = table
        .select(fields.iter().map(String::as_str))
        .map_err(|e| Error::schema_for_year(year, format!("column projection failed: {}", e)))?;

    debug!(
        "Year {}: projected {} of {} source columns, {} rows",
        year,
        projected.width(),
        table.width(),
        projected.height()
    );

    Ok(NormalizedRows {
        height: projected.height(),
        columns: projected.take_columns(),
        next_row: 0,
        year,
    })
}

/// Whether the decoder renamed a second copy of `name`
fn is_repeated(table: &DataFrame, name: &str) -> bool {
    let prefix = format!("{}{}", name, DUPLICATE_HEADER_SUFFIX);
    table.get_column_names().iter().any(|column| {
        column
            .strip_prefix(prefix.as_str())
            .is_some_and(|counter| {
                !counter.is_empty() && counter.bytes().all(|b| b.is_ascii_digit())
            })
    })
}

/// Single-pass sequence of normalized records
///
/// Once consumed it yields nothing more; normalize the table again to
/// restart.
#[derive(Debug)]
pub struct NormalizedRows {
    columns: Vec<Column>,
    height: usize,
    next_row: usize,
    year: u16,
}

impl NormalizedRows {
    /// Year these rows were normalized for
    pub fn year(&self) -> u16 {
        self.year
    }

    fn record_at(&self, row: usize) -> Result<SurveyRecord> {
        let mut cells: [Cell; CANONICAL_ARITY] = std::array::from_fn(|_| Cell::Null);
        for (cell, column) in cells.iter_mut().zip(&self.columns) {
            let value = column.get(row).map_err(|e| {
                Error::schema_for_year(
                    self.year,
                    format!("row {} of column '{}' unreadable: {}", row, column.name(), e),
                )
            })?;
            *cell = cell_from_any(value);
        }
        Ok(SurveyRecord::from_cells(cells))
    }
}

impl Iterator for NormalizedRows {
    type Item = Result<SurveyRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_row >= self.height {
            return None;
        }
        let row = self.next_row;
        self.next_row += 1;
        Some(self.record_at(row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.height - self.next_row;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for NormalizedRows {}

/// Carry a polars value over as the equivalent store cell
pub fn cell_from_any(value: AnyValue<'_>) -> Cell {
    match value {
        AnyValue::Null => Cell::Null,
        AnyValue::Boolean(v) => Cell::Integer(i64::from(v)),
        AnyValue::Int8(v) => Cell::Integer(i64::from(v)),
        AnyValue::Int16(v) => Cell::Integer(i64::from(v)),
        AnyValue::Int32(v) => Cell::Integer(i64::from(v)),
        AnyValue::Int64(v) => Cell::Integer(v),
        AnyValue::UInt8(v) => Cell::Integer(i64::from(v)),
        AnyValue::UInt16(v) => Cell::Integer(i64::from(v)),
        AnyValue::UInt32(v) => Cell::Integer(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v)
            .map(Cell::Integer)
            .unwrap_or(Cell::Real(v as f64)),
        AnyValue::Float32(v) => Cell::Real(f64::from(v)),
        AnyValue::Float64(v) => Cell::Real(v),
        AnyValue::String(v) => Cell::Text(v.to_string()),
        AnyValue::StringOwned(v) => Cell::Text(v.to_string()),
        other => Cell::Text(other.to_string()),
    }
}
