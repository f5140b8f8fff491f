mod config;
mod db;
mod header;
mod import;
mod results;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Imports metadata-benchmark log files into a SQLite results table:
/// header key/value pairs become per-run columns, metric-report lines
/// become rows.
#[derive(Parser, Debug)]
#[command(name = "benchdb", version, about)]
struct Cli {
    /// Label stored verbatim with every imported row
    prefix: String,

    /// Log files to import, in order; the table schema is derived from the first
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Config file path
    #[arg(short, long, default_value = "benchdb.toml")]
    config: PathBuf,

    /// Database path (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Table name (overrides config)
    #[arg(long)]
    table: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cfg = config::load(&cli.config);
    let db_path = cli.db.unwrap_or(cfg.database.path);
    let table = cli.table.unwrap_or(cfg.database.table);

    println!("Importing : {}", cli.prefix);

    let mut conn = match db::open(&db_path) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("Failed to open database {}: {e}", db_path.display());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = import::run(&mut conn, &table, &cli.prefix, &cli.files) {
        eprintln!("Import failed: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
