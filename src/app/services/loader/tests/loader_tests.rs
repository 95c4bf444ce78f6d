//! Tests for the import protocol

use super::*;
use crate::app::models::{CanonicalField, Cell};
use crate::app::services::loader::Loader;
use crate::app::services::query_service::query;
use crate::app::services::source_fetcher::SpreadsheetFetcher;
use crate::app::services::source_fetcher::tests::write_survey_file;
use polars::prelude::Column;
use tempfile::TempDir;

fn row_count(destination: &Path) -> i64 {
    match query(destination, "select count(*) from VIGITEL").unwrap()[0][0] {
        Cell::Integer(n) => n,
        ref other => panic!("Expected integer count, got {:?}", other),
    }
}

fn years_by_id(destination: &Path) -> Vec<Cell> {
    query(destination, "select ANO from VIGITEL order by ID")
        .unwrap()
        .into_iter()
        .map(|mut row| row.remove(0))
        .collect()
}

#[test]
fn test_two_years_load_in_chronological_order() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("survey.db");
    let fetcher = InMemoryFetcher::new()
        .with_year(2010, 3, "q76")
        .with_year(2009, 3, "q76");

    // Years are configured out of order on purpose
    let loader = Loader::new(&csv_source(temp_dir.path(), &[2010, 2009]), fetcher).unwrap();
    let summary = loader
        .recreate_and_import(&Origin::local(temp_dir.path()), &destination)
        .unwrap();

    assert_eq!(summary.total_rows, 6);
    assert_eq!(summary.rows_for(2009), Some(3));
    assert_eq!(row_count(&destination), 6);

    let expected: Vec<Cell> = [2009, 2009, 2009, 2010, 2010, 2010]
        .into_iter()
        .map(Cell::Integer)
        .collect();
    assert_eq!(years_by_id(&destination), expected);
}

#[test]
fn test_ids_are_sequential_across_files() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("survey.db");
    let fetcher = InMemoryFetcher::new()
        .with_year(2011, 2, "q76")
        .with_year(2012, 2, "q76");

    Loader::new(&csv_source(temp_dir.path(), &[2011, 2012]), fetcher)
        .unwrap()
        .recreate_and_import(&Origin::local(temp_dir.path()), &destination)
        .unwrap();

    let ids: Vec<Cell> = query(&destination, "select ID from VIGITEL order by ID")
        .unwrap()
        .into_iter()
        .map(|mut row| row.remove(0))
        .collect();
    assert_eq!(ids, (1..=4).map(Cell::Integer).collect::<Vec<_>>());
}

#[test]
fn test_rerun_replaces_previous_import() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("survey.db");
    let source = csv_source(temp_dir.path(), &[2009, 2010]);
    let origin = Origin::local(temp_dir.path());

    for _ in 0..2 {
        let fetcher = InMemoryFetcher::new()
            .with_year(2009, 4, "q76")
            .with_year(2010, 5, "q76");
        Loader::new(&source, fetcher)
            .unwrap()
            .recreate_and_import(&origin, &destination)
            .unwrap();
    }

    assert_eq!(row_count(&destination), 9);
}

#[test]
fn test_fetch_failure_stops_after_committed_years() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("survey.db");
    let fetcher = InMemoryFetcher::new()
        .with_year(2015, 3, "q76")
        .with_year(2017, 3, "q76");

    let loader = Loader::new(&csv_source(temp_dir.path(), &[2015, 2016, 2017]), fetcher).unwrap();
    let err = loader
        .recreate_and_import(&Origin::local(temp_dir.path()), &destination)
        .unwrap_err();

    match &err {
        Error::Fetch { message, .. } => assert!(message.contains("year 2016")),
        other => panic!("Expected Fetch error, got {:?}", other),
    }

    // 2017 is never requested
    let requests = loader.fetcher.requests();
    assert_eq!(requests, vec![csv_filename(2015), csv_filename(2016)]);

    assert_eq!(years_by_id(&destination), vec![Cell::Integer(2015); 3]);
}

#[test]
fn test_schema_failure_rolls_back_failing_year() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("survey.db");

    // The 2014 file still publishes q76 instead of q76a
    let fetcher = InMemoryFetcher::new()
        .with_year(2013, 2, "q76")
        .with_year(2014, 2, "q76");

    let err = Loader::new(&csv_source(temp_dir.path(), &[2013, 2014]), fetcher)
        .unwrap()
        .recreate_and_import(&Origin::local(temp_dir.path()), &destination)
        .unwrap_err();

    match err {
        Error::Schema { year, message } => {
            assert_eq!(year, Some(2014));
            assert!(message.contains("q76a"));
            assert!(message.contains(&csv_filename(2014)));
        }
        other => panic!("Expected Schema error, got {:?}", other),
    }
    assert_eq!(years_by_id(&destination), vec![Cell::Integer(2013); 2]);
}

#[test]
fn test_renamed_diabetes_year_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("survey.db");
    let fetcher = InMemoryFetcher::new()
        .with_year(2013, 1, "q76")
        .with_year(2014, 1, "q76a");

    Loader::new(&csv_source(temp_dir.path(), &[2013, 2014]), fetcher)
        .unwrap()
        .recreate_and_import(&Origin::local(temp_dir.path()), &destination)
        .unwrap();

    let rows = query(&destination, "select ANO, DIABETES from VIGITEL order by ID").unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Cell::Integer(2013), Cell::Integer(1)],
            vec![Cell::Integer(2014), Cell::Integer(1)],
        ]
    );
}

#[test]
fn test_unusable_table_adds_no_rows_for_its_year() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("survey.db");

    // A header-only table lacks every registered field
    let empty = DataFrame::new(vec![Column::new("pesorake".into(), Vec::<f64>::new())]).unwrap();
    let fetcher = InMemoryFetcher::new()
        .with_year(2018, 2, "q76")
        .with_table(2019, empty);

    let err = Loader::new(&csv_source(temp_dir.path(), &[2018, 2019]), fetcher)
        .unwrap()
        .recreate_and_import(&Origin::local(temp_dir.path()), &destination)
        .unwrap_err();

    assert!(err.is_schema());
    assert_eq!(row_count(&destination), 2);
}

#[test]
fn test_stale_store_is_deleted_first() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("survey.db");
    std::fs::write(&destination, "left over from an older run").unwrap();
    let journal = temp_dir.path().join("survey.db-journal");
    std::fs::write(&journal, "stale journal").unwrap();

    let fetcher = InMemoryFetcher::new().with_year(2009, 1, "q76");
    Loader::new(&csv_source(temp_dir.path(), &[2009]), fetcher)
        .unwrap()
        .recreate_and_import(&Origin::local(temp_dir.path()), &destination)
        .unwrap();

    assert_eq!(row_count(&destination), 1);
    assert!(!journal.exists());
}

#[test]
fn test_progress_reports_each_committed_file() {
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("survey.db");
    let fetcher = InMemoryFetcher::new()
        .with_year(2009, 2, "q76")
        .with_year(2010, 3, "q76");

    let mut seen = Vec::new();
    Loader::new(&csv_source(temp_dir.path(), &[2009, 2010]), fetcher)
        .unwrap()
        .recreate_and_import_with_progress(
            &Origin::local(temp_dir.path()),
            &destination,
            |file, rows| seen.push((file.year, rows)),
        )
        .unwrap();

    assert_eq!(seen, vec![(2009, 2), (2010, 3)]);
}

#[test]
fn test_import_from_local_csv_files() {
    let source_dir = TempDir::new().unwrap();
    let store_dir = TempDir::new().unwrap();
    let destination = store_dir.path().join("survey.db");
    write_survey_file(source_dir.path(), 2009, 3, "q76");
    write_survey_file(source_dir.path(), 2014, 2, "q76a");

    let loader = Loader::new(
        &csv_source(source_dir.path(), &[2009, 2014]),
        SpreadsheetFetcher::new().unwrap(),
    )
    .unwrap();
    let summary = loader
        .recreate_and_import(&Origin::local(source_dir.path()), &destination)
        .unwrap();

    assert_eq!(summary.total_rows, 5);
    let rows = query(&destination, "select PESO, IMC, CIVIL from VIGITEL where ID = 1").unwrap();
    assert_eq!(
        rows[0],
        vec![Cell::Real(70.5), Cell::Real(24.5), Cell::Integer(888)]
    );
}

#[test]
fn test_source_files_follow_naming_convention() {
    let temp_dir = TempDir::new().unwrap();
    let source = csv_source(temp_dir.path(), &[2019, 2009]);
    let loader = Loader::new(&source, InMemoryFetcher::new()).unwrap();

    let names: Vec<String> = loader.source_files().into_iter().map(|f| f.filename).collect();
    assert_eq!(
        names,
        vec!["Vigitel-2009-peso-rake.csv", "Vigitel-2019-peso-rake.csv"]
    );
    assert_eq!(
        loader.registry().source_for(2019, CanonicalField::Diabetes).unwrap(),
        "q76"
    );
}
