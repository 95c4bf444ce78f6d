//! Query command implementation
//!
//! Runs one SQL statement against the store and prints the rows. With
//! `--decode`, columns named after canonical fields are rendered through the
//! survey codebook so coded answers and sentinel codes show their meaning.

use super::shared::{load_configuration, setup_logging};
use crate::app::models::codebook::Codebook;
use crate::app::models::{CanonicalField, Cell};
use crate::app::services::query_service::{QueryResult, QueryService};
use crate::cli::args::{OutputFormat, QueryArgs};
use anyhow::Context;
use colored::*;
use tracing::debug;

/// Query command runner
pub fn run_query(args: QueryArgs) -> anyhow::Result<()> {
    let mut config = load_configuration(args.config_file.as_deref())?;
    if let Some(destination) = &args.destination {
        config.store.destination = destination.clone();
    }
    if let Some(level) = args.get_log_level() {
        config.logging.level = level.to_string();
    }
    setup_logging(&config.logging.level, false);
    debug!("Query arguments: {:?}", args);

    let service = QueryService::new(&config.store.destination);
    let result = service
        .query_with_columns(&args.sql)
        .with_context(|| format!("Query against {} failed", config.store.destination.display()))?;

    let codebook = args.decode.then(Codebook::vigitel);
    let rendered = render_rows(&result, codebook.as_ref());

    match args.output_format {
        OutputFormat::Table => print_table(&result.columns, &rendered),
        OutputFormat::Csv => print_csv(&result.columns, &rendered),
    }
    Ok(())
}

/// Render every cell as text, decoding canonical columns when a codebook is given
pub fn render_rows(result: &QueryResult, codebook: Option<&Codebook>) -> Vec<Vec<String>> {
    let fields: Vec<Option<CanonicalField>> = result
        .columns
        .iter()
        .map(|name| CanonicalField::from_column_name(name))
        .collect();

    result
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&fields)
                .map(|(cell, field)| render_cell(cell, *field, codebook))
                .collect()
        })
        .collect()
}

fn render_cell(cell: &Cell, field: Option<CanonicalField>, codebook: Option<&Codebook>) -> String {
    match (codebook, field) {
        (Some(codebook), Some(field)) if field.is_measurement() => codebook
            .decode_measurement(field, cell)
            .and_then(|answer| answer.sentinel_label())
            .map_or_else(|| cell.to_string(), str::to_string),
        (Some(codebook), Some(field)) => codebook.describe(field, cell),
        _ => cell.to_string(),
    }
}

fn print_table(columns: &[String], rows: &[Vec<String>]) {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect();
    println!("{}", header.join("  ").bright_cyan().bold());

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{:<width$}", value, width = width))
            .collect();
        println!("{}", line.join("  "));
    }

    println!(
        "{}",
        format!("({} rows)", rows.len()).bright_white()
    );
}

fn print_csv(columns: &[String], rows: &[Vec<String>]) {
    println!("{}", csv_line(columns));
    for row in rows {
        println!("{}", csv_line(row));
    }
}

/// One CSV record, quoting fields that need it
pub fn csv_line(values: &[String]) -> String {
    values
        .iter()
        .map(|value| {
            if value.contains([',', '"', '\n', '\r']) {
                format!("\"{}\"", value.replace('"', "\"\""))
            } else {
                value.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
