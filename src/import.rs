use crate::db;
use crate::header::{self, HeaderBlock};
use crate::results;
use rusqlite::Connection;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Reads the header of one representative file and freezes its key list as
/// the dynamic part of the table schema. Later files must match it.
pub fn discover_schema(path: &Path) -> Result<Vec<String>, ImportError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let header = header::parse_header(&mut reader)?;
    Ok(header.keys().map(str::to_string).collect())
}

/// Imports every file into `table` inside a single transaction. Nothing is
/// durable until the last file has been processed; any failure rolls the
/// whole run back.
pub fn run(
    conn: &mut Connection,
    table: &str,
    prefix: &str,
    files: &[PathBuf],
) -> Result<(), ImportError> {
    let Some(first) = files.first() else {
        return Ok(());
    };
    let schema_keys = discover_schema(first)?;
    tracing::debug!(keys = schema_keys.len(), "discovered header schema");

    let tx = conn.transaction()?;
    db::create_results_table(&tx, table, &schema_keys)?;
    for file in files {
        let rows = import_file(&tx, table, &schema_keys, prefix, file)?;
        tracing::debug!(file = %file.display(), rows, "imported");
    }
    tx.commit()?;
    Ok(())
}

/// Imports one file: header values plus one row per metric line.
fn import_file(
    conn: &Connection,
    table: &str,
    schema_keys: &[String],
    prefix: &str,
    path: &Path,
) -> Result<u64, ImportError> {
    println!("Importing {}", path.display());

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let header = header::parse_header(&mut reader)?;
    validate_header(&header, schema_keys, path)?;
    let header_values: Vec<String> = header.values().map(str::to_string).collect();
    let file_name = path.display().to_string();

    let mut rows = 0;
    for record in results::parse_results(reader) {
        let record = record?;
        db::insert_row(
            conn,
            table,
            schema_keys,
            prefix,
            &file_name,
            &record,
            &header_values,
        )?;
        rows += 1;
    }
    Ok(rows)
}

/// A file whose header keys diverge from the frozen schema would bind its
/// values against the wrong columns, so it is rejected outright.
fn validate_header(
    header: &HeaderBlock,
    schema_keys: &[String],
    path: &Path,
) -> Result<(), ImportError> {
    if header.keys().ne(schema_keys.iter().map(String::as_str)) {
        return Err(ImportError::SchemaMismatch {
            file: path.to_path_buf(),
            expected: schema_keys.to_vec(),
            found: header.keys().map(str::to_string).collect(),
        });
    }
    Ok(())
}

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Db(rusqlite::Error),
    SchemaMismatch {
        file: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(e) => write!(f, "I/O error during import: {e}"),
            ImportError::Db(e) => write!(f, "database error during import: {e}"),
            ImportError::SchemaMismatch {
                file,
                expected,
                found,
            } => write!(
                f,
                "header keys of {} do not match the schema derived from the first file \
                 (expected [{}], found [{}])",
                file.display(),
                expected.join(", "),
                found.join(", ")
            ),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(e) => Some(e),
            ImportError::Db(e) => Some(e),
            ImportError::SchemaMismatch { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        ImportError::Io(e)
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(e: rusqlite::Error) -> Self {
        ImportError::Db(e)
    }
}
