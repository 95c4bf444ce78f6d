//! Data models for Vigitel survey records
//!
//! This module contains the canonical column set every survey year is
//! normalized into, the raw cell values carried from source sheets into the
//! store, and the named survey record built from them.

use crate::constants;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod codebook;

// =============================================================================
// Canonical Columns
// =============================================================================

/// Storage type of a destination column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
}

impl ColumnType {
    /// SQL type name used in the table definition
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
        }
    }
}

/// One of the fifteen data columns of the destination table
///
/// Variant order is the serialization order: it must match the destination
/// table's column order after the surrogate `ID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Year,
    City,
    Age,
    Sex,
    MaritalStatus,
    YearsOfEducation,
    Weight,
    Height,
    ExercisesRegularly,
    ExerciseFrequencyBand,
    SmokingStatus,
    SelfReportedRace,
    Hypertension,
    Diabetes,
    Bmi,
}

impl CanonicalField {
    /// All canonical fields in destination column order
    pub const ALL: [CanonicalField; constants::CANONICAL_ARITY] = [
        CanonicalField::Year,
        CanonicalField::City,
        CanonicalField::Age,
        CanonicalField::Sex,
        CanonicalField::MaritalStatus,
        CanonicalField::YearsOfEducation,
        CanonicalField::Weight,
        CanonicalField::Height,
        CanonicalField::ExercisesRegularly,
        CanonicalField::ExerciseFrequencyBand,
        CanonicalField::SmokingStatus,
        CanonicalField::SelfReportedRace,
        CanonicalField::Hypertension,
        CanonicalField::Diabetes,
        CanonicalField::Bmi,
    ];

    /// Zero-based position among the data columns
    pub fn index(self) -> usize {
        self as usize
    }

    /// Destination column name
    pub fn column_name(self) -> &'static str {
        match self {
            CanonicalField::Year => "ANO",
            CanonicalField::City => "CIDADE",
            CanonicalField::Age => "IDADE",
            CanonicalField::Sex => "SEXO",
            CanonicalField::MaritalStatus => "CIVIL",
            CanonicalField::YearsOfEducation => "ESTUDO_ANOS",
            CanonicalField::Weight => "PESO",
            CanonicalField::Height => "ALTURA",
            CanonicalField::ExercisesRegularly => "EXERCICIO_FISICO",
            CanonicalField::ExerciseFrequencyBand => "EXERCICIO_FREQ",
            CanonicalField::SmokingStatus => "FUMANTE",
            CanonicalField::SelfReportedRace => "COR",
            CanonicalField::Hypertension => "PRESSAO_ALTA",
            CanonicalField::Diabetes => "DIABETES",
            CanonicalField::Bmi => "IMC",
        }
    }

    /// Source field name used by every year without an override
    pub fn standard_source(self) -> &'static str {
        match self {
            CanonicalField::Year => "ano",
            CanonicalField::City => "cidade",
            CanonicalField::Age => "q6",
            CanonicalField::Sex => "q7",
            CanonicalField::MaritalStatus => "civil",
            CanonicalField::YearsOfEducation => "q8_anos",
            CanonicalField::Weight => "q9",
            CanonicalField::Height => "q11",
            CanonicalField::ExercisesRegularly => "q42",
            CanonicalField::ExerciseFrequencyBand => "q45",
            CanonicalField::SmokingStatus => "q60",
            CanonicalField::SelfReportedRace => "q69",
            CanonicalField::Hypertension => "q75",
            CanonicalField::Diabetes => "q76",
            CanonicalField::Bmi => "imc",
        }
    }

    /// Destination column storage type
    pub fn column_type(self) -> ColumnType {
        match self {
            CanonicalField::Weight | CanonicalField::Bmi => ColumnType::Real,
            _ => ColumnType::Integer,
        }
    }

    /// Whether the field holds a measured quantity rather than a coded answer
    pub fn is_measurement(self) -> bool {
        matches!(self, CanonicalField::Weight | CanonicalField::Height)
    }

    /// Look up a field by its destination column name (case-insensitive)
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.column_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// =============================================================================
// Cell Values
// =============================================================================

/// A single value as provided by the source format
///
/// No coercion happens here: integers stay integers, reals stay reals and
/// text stays text. Sentinel codes such as 777 or 888 are ordinary values.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    /// Integer view of the cell, accepting integral reals
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(v) => Some(*v),
            Cell::Real(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Numeric view of the cell
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NULL"),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Real(v) => write!(f, "{}", v),
            Cell::Text(v) => f.write_str(v),
        }
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            Cell::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            Cell::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
        })
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(v) => Cell::Integer(v),
            ValueRef::Real(v) => Cell::Real(v),
            ValueRef::Text(bytes) => Cell::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Cell::Text(format!("<blob {} bytes>", bytes.len())),
        }
    }
}

// =============================================================================
// Survey Record
// =============================================================================

/// One surveyed individual in one survey year
///
/// Fields are named; [`SurveyRecord::values`] serializes them in
/// [`CanonicalField::ALL`] order for positional binding.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    pub year: Cell,
    pub city: Cell,
    pub age: Cell,
    pub sex: Cell,
    pub marital_status: Cell,
    pub years_of_education: Cell,
    pub weight: Cell,
    pub height: Cell,
    pub exercises_regularly: Cell,
    pub exercise_frequency_band: Cell,
    pub smoking_status: Cell,
    pub self_reported_race: Cell,
    pub hypertension: Cell,
    pub diabetes: Cell,
    pub bmi: Cell,
}

impl SurveyRecord {
    /// Build a record from cells given in canonical column order
    pub fn from_cells(cells: [Cell; constants::CANONICAL_ARITY]) -> Self {
        let [
            year,
            city,
            age,
            sex,
            marital_status,
            years_of_education,
            weight,
            height,
            exercises_regularly,
            exercise_frequency_band,
            smoking_status,
            self_reported_race,
            hypertension,
            diabetes,
            bmi,
        ] = cells;

        Self {
            year,
            city,
            age,
            sex,
            marital_status,
            years_of_education,
            weight,
            height,
            exercises_regularly,
            exercise_frequency_band,
            smoking_status,
            self_reported_race,
            hypertension,
            diabetes,
            bmi,
        }
    }

    /// Value of a single canonical field
    pub fn get(&self, field: CanonicalField) -> &Cell {
        match field {
            CanonicalField::Year => &self.year,
            CanonicalField::City => &self.city,
            CanonicalField::Age => &self.age,
            CanonicalField::Sex => &self.sex,
            CanonicalField::MaritalStatus => &self.marital_status,
            CanonicalField::YearsOfEducation => &self.years_of_education,
            CanonicalField::Weight => &self.weight,
            CanonicalField::Height => &self.height,
            CanonicalField::ExercisesRegularly => &self.exercises_regularly,
            CanonicalField::ExerciseFrequencyBand => &self.exercise_frequency_band,
            CanonicalField::SmokingStatus => &self.smoking_status,
            CanonicalField::SelfReportedRace => &self.self_reported_race,
            CanonicalField::Hypertension => &self.hypertension,
            CanonicalField::Diabetes => &self.diabetes,
            CanonicalField::Bmi => &self.bmi,
        }
    }

    /// All values in destination column order
    pub fn values(&self) -> [&Cell; constants::CANONICAL_ARITY] {
        CanonicalField::ALL.map(|field| self.get(field))
    }
}

// =============================================================================
// Source Files
// =============================================================================

/// One yearly source file of the survey
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub year: u16,
    pub filename: String,
}

impl SourceFile {
    /// Source file for a year following `<Survey>-<year>-peso-rake.<ext>`
    pub fn new(survey: &str, year: u16, extension: &str) -> Self {
        Self {
            year,
            filename: constants::source_filename(survey, year, extension),
        }
    }

    /// Lowercased file extension, if any
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}
