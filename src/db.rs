use crate::results::MetricRecord;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Result};
use std::path::Path;

/// Fixed columns present in every results table, ahead of the per-run
/// columns discovered from the first imported file's header.
const FIXED_COLUMNS: &str = "prefix text, file text, phase char, iteration int, \
     process int, errors int, obj_per_s float, throughput_MiB float";

/// Opens (or creates) the results database at the given path.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;

    // Enable WAL mode for better concurrent read performance
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    Ok(conn)
}

/// Double-quotes an identifier so header-derived column names cannot break
/// out of the statement.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Creates the results table if absent: the fixed metric columns plus one
/// float-affinity column per discovered header key. The table is never
/// dropped or altered afterwards; rows are only ever appended.
pub fn create_results_table(
    conn: &Connection,
    table: &str,
    header_keys: &[String],
) -> Result<()> {
    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {} ({FIXED_COLUMNS}",
        quote_ident(table)
    );
    for key in header_keys {
        sql.push_str(", ");
        sql.push_str(&quote_ident(key));
        sql.push_str(" float");
    }
    sql.push(')');
    conn.execute(&sql, [])?;
    Ok(())
}

/// Appends one metric record, with the file's header values bound in schema
/// order after the fixed fields. Everything goes through parameter binding;
/// header values legitimately contain quotes and must survive intact.
///
/// Header values are bound as text: SQLite's float affinity converts the
/// numeric ones and keeps the rest (e.g. `interface=posix`) as-is.
pub fn insert_row(
    conn: &Connection,
    table: &str,
    header_keys: &[String],
    prefix: &str,
    file: &str,
    record: &MetricRecord,
    header_values: &[String],
) -> Result<()> {
    let mut columns = String::from(
        "prefix, file, phase, iteration, process, errors, obj_per_s, throughput_MiB",
    );
    for key in header_keys {
        columns.push_str(", ");
        columns.push_str(&quote_ident(key));
    }
    let placeholders = vec!["?"; 8 + header_keys.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({columns}) VALUES ({placeholders})",
        quote_ident(table)
    );
    let mut stmt = conn.prepare_cached(&sql)?;

    let mut values: Vec<Value> = Vec::with_capacity(8 + header_values.len());
    values.push(Value::Text(prefix.to_string()));
    values.push(Value::Text(file.to_string()));
    values.push(Value::Text(record.phase.to_string()));
    values.push(Value::Integer(record.iteration));
    values.push(record.process.map_or(Value::Null, Value::Integer));
    values.push(Value::Integer(record.errors));
    values.push(Value::Real(record.objects_per_second));
    values.push(record.throughput_mib.map_or(Value::Null, Value::Real));
    for value in header_values {
        values.push(Value::Text(value.clone()));
    }
    stmt.execute(params_from_iter(values))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_db() -> (TempDir, Connection) {
        let dir = TempDir::new().unwrap();
        let conn = open(&dir.path().join("results.db")).unwrap();
        (dir, conn)
    }

    fn sample_record() -> MetricRecord {
        MetricRecord {
            phase: 'b',
            process: Some(2),
            iteration: 0,
            objects_per_second: 980.25,
            throughput_mib: Some(3.7),
            errors: 1,
        }
    }

    #[test]
    fn creates_table_with_dynamic_columns() {
        let (_dir, conn) = test_db();
        let keys = vec!["num".to_string(), "plugin_host".to_string()];
        create_results_table(&conn, "results", &keys).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('results')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 10); // 8 fixed + 2 dynamic
    }

    #[test]
    fn idempotent_creation() {
        let (_dir, conn) = test_db();
        let keys = vec!["num".to_string()];
        create_results_table(&conn, "results", &keys).unwrap();
        create_results_table(&conn, "results", &keys).unwrap();
    }

    #[test]
    fn insert_and_query_row() {
        let (_dir, conn) = test_db();
        let keys = vec!["num".to_string(), "interface".to_string()];
        create_results_table(&conn, "results", &keys).unwrap();

        let values = vec!["1000".to_string(), "posix".to_string()];
        insert_row(
            &conn,
            "results",
            &keys,
            "run-a",
            "out.log",
            &sample_record(),
            &values,
        )
        .unwrap();

        let (prefix, phase, process, obj): (String, String, i64, f64) = conn
            .query_row(
                "SELECT prefix, phase, process, obj_per_s FROM results",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(prefix, "run-a");
        assert_eq!(phase, "b");
        assert_eq!(process, 2);
        assert_eq!(obj, 980.25);

        // Numeric header text lands as a REAL via column affinity; the
        // non-numeric one stays text.
        let num: f64 = conn
            .query_row("SELECT num FROM results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(num, 1000.0);
        let interface: String = conn
            .query_row("SELECT interface FROM results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(interface, "posix");
    }

    #[test]
    fn nullable_fields_roundtrip() {
        let (_dir, conn) = test_db();
        create_results_table(&conn, "results", &[]).unwrap();

        let record = MetricRecord {
            phase: 'w',
            process: None,
            iteration: 1,
            objects_per_second: 50.0,
            throughput_mib: None,
            errors: 0,
        };
        insert_row(&conn, "results", &[], "p", "f", &record, &[]).unwrap();

        let (process, mib): (Option<i64>, Option<f64>) = conn
            .query_row("SELECT process, throughput_MiB FROM results", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(process, None);
        assert_eq!(mib, None);
    }

    #[test]
    fn header_value_with_quotes_survives() {
        let (_dir, conn) = test_db();
        let keys = vec!["dir".to_string()];
        create_results_table(&conn, "results", &keys).unwrap();

        let values = vec![r#"./out/"quoted" path"#.to_string()];
        insert_row(&conn, "results", &keys, "p", "f", &sample_record(), &values).unwrap();

        let dir: String = conn
            .query_row("SELECT dir FROM results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(dir, r#"./out/"quoted" path"#);
    }

    #[test]
    fn quoted_identifiers_accept_odd_keys() {
        let (_dir, conn) = test_db();
        let keys = vec![r#"weird"key"#.to_string()];
        create_results_table(&conn, "results", &keys).unwrap();

        insert_row(
            &conn,
            "results",
            &keys,
            "p",
            "f",
            &sample_record(),
            &["v".to_string()],
        )
        .unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn append_only_no_dedup() {
        let (_dir, conn) = test_db();
        create_results_table(&conn, "results", &[]).unwrap();

        insert_row(&conn, "results", &[], "p", "f", &sample_record(), &[]).unwrap();
        insert_row(&conn, "results", &[], "p", "f", &sample_record(), &[]).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
