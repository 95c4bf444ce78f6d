//! SQLite destination store for normalized survey records
//!
//! Owns the table definition and the positional insert statement, both
//! generated from [`CanonicalField::ALL`] so the declared record order and
//! the table layout cannot drift apart. After creating the table the store
//! reads the layout back and refuses to load if it does not match.

use crate::app::models::{CanonicalField, SurveyRecord};
use crate::constants::{ID_COLUMN, TABLE_NAME};
use crate::{Error, Result};
use rusqlite::{Connection, OpenFlags, params_from_iter};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// `CREATE TABLE` statement for the destination table
pub fn create_table_sql() -> String {
    let columns: Vec<String> = CanonicalField::ALL
        .iter()
        .map(|field| format!("{} {}", field.column_name(), field.column_type().sql_name()))
        .collect();

    format!(
        "create table {} ({} integer primary key autoincrement not null, {})",
        TABLE_NAME,
        ID_COLUMN,
        columns.join(", ")
    )
}

/// Positional `INSERT` statement binding the fifteen data columns
pub fn insert_sql() -> String {
    let names: Vec<&str> = CanonicalField::ALL
        .iter()
        .map(|field| field.column_name())
        .collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();

    format!(
        "insert into {} ({}) values ({})",
        TABLE_NAME,
        names.join(", "),
        placeholders.join(", ")
    )
}

/// Connection to the destination store
///
/// The connection is closed when the store is dropped, on success and
/// failure paths alike.
#[derive(Debug)]
pub struct SurveyStore {
    conn: Connection,
    path: PathBuf,
}

impl SurveyStore {
    /// Delete any existing store at `path` and create an empty one
    ///
    /// This is destructive: previous contents are removed without backup.
    pub fn recreate(path: &Path) -> Result<Self> {
        remove_existing(path)?;

        let conn = Connection::open(path).map_err(|e| {
            Error::storage(format!("cannot create store {}", path.display()), Some(e))
        })?;
        let store = Self {
            conn,
            path: path.to_path_buf(),
        };

        store.create_schema()?;
        store.verify_column_order()?;
        Ok(store)
    }

    /// Open an existing store without creating it
    pub fn open_existing(path: &Path, read_only: bool) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::storage(
                format!("store {} does not exist", path.display()),
                None,
            ));
        }

        let flags = if read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
        };
        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            Error::storage(format!("cannot open store {}", path.display()), Some(e))
        })?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the destination table
    pub fn create_schema(&self) -> Result<()> {
        let sql = create_table_sql();
        debug!("Creating destination table: {}", sql);
        self.conn.execute_batch(&sql)?;
        Ok(())
    }

    /// Check that the table's columns are `ID` followed by the canonical fields
    pub fn verify_column_order(&self) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare(&format!("pragma table_info({})", TABLE_NAME))?;
        let columns: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<rusqlite::Result<_>>()?;

        let expected: Vec<(&str, &str)> = std::iter::once((ID_COLUMN, "integer"))
            .chain(
                CanonicalField::ALL
                    .iter()
                    .map(|field| (field.column_name(), field.column_type().sql_name())),
            )
            .collect();

        if columns.len() != expected.len() {
            return Err(Error::schema(format!(
                "table {} has {} columns, expected {}",
                TABLE_NAME,
                columns.len(),
                expected.len()
            )));
        }

        for (position, ((name, declared), (expected_name, expected_type))) in
            columns.iter().zip(&expected).enumerate()
        {
            if !name.eq_ignore_ascii_case(expected_name)
                || !declared.eq_ignore_ascii_case(expected_type)
            {
                return Err(Error::schema(format!(
                    "column {} of {} is '{} {}', expected '{} {}'",
                    position, TABLE_NAME, name, declared, expected_name, expected_type
                )));
            }
        }

        Ok(())
    }

    /// Insert a single record outside any explicit transaction
    ///
    /// Returns the generated surrogate ID.
    pub fn insert_record(&self, record: &SurveyRecord) -> Result<i64> {
        let mut stmt = self.conn.prepare_cached(&insert_sql())?;
        stmt.execute(params_from_iter(record.values()))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert every record of one source file inside a single transaction
    ///
    /// The transaction commits only after the last record is written. Any
    /// error, whether raised by the record source or by SQLite, rolls the
    /// whole file back.
    pub fn load_file<I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<SurveyRecord>>,
    {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare_cached(&insert_sql())?;
            for record in records {
                let record = record?;
                stmt.execute(params_from_iter(record.values()))?;
                inserted += 1;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Number of rows in the destination table
    pub fn row_count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("select count(*) from {}", TABLE_NAME),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Close the connection, reporting any error SQLite raises while closing
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| Error::storage("failed to close store", Some(e)))
    }
}

fn remove_existing(path: &Path) -> Result<()> {
    if path.exists() {
        warn!("Deleting existing store {}", path.display());
        std::fs::remove_file(path).map_err(|e| {
            Error::io(format!("Failed to delete existing store {}", path.display()), e)
        })?;
    }

    let mut journal = path.as_os_str().to_owned();
    journal.push("-journal");
    let journal = PathBuf::from(journal);
    if journal.exists() {
        debug!("Deleting stale journal {}", journal.display());
        std::fs::remove_file(&journal).map_err(|e| {
            Error::io(format!("Failed to delete stale journal {}", journal.display()), e)
        })?;
    }

    Ok(())
}
