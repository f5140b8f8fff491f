use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration loaded from benchdb.toml.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ImportConfig {
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("results.db"),
            table: "results".to_string(),
        }
    }
}

/// Load config from the given path, or defaults when the file is missing
/// or unparsable.
pub fn load(path: &Path) -> ImportConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("failed to parse {}: {e}", path.display());
                ImportConfig::default()
            }
        },
        Err(_) => ImportConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_file_missing() {
        let cfg = load(Path::new("/nonexistent/benchdb.toml"));
        assert_eq!(cfg.database.path, PathBuf::from("results.db"));
        assert_eq!(cfg.database.table, "results");
    }

    #[test]
    fn parses_database_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("benchdb.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[database]\npath = \"bench.db\"\ntable = \"r\"").unwrap();

        let cfg = load(&path);
        assert_eq!(cfg.database.path, PathBuf::from("bench.db"));
        assert_eq!(cfg.database.table, "r");
    }

    #[test]
    fn partial_section_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("benchdb.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[database]\npath = \"bench.db\"").unwrap();

        let cfg = load(&path);
        assert_eq!(cfg.database.path, PathBuf::from("bench.db"));
        assert_eq!(cfg.database.table, "results");
    }

    #[test]
    fn invalid_toml_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("benchdb.toml");
        std::fs::write(&path, "not [valid toml").unwrap();

        let cfg = load(&path);
        assert_eq!(cfg.database.table, "results");
    }
}
