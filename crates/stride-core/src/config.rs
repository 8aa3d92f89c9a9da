//! Configuration types and parsing for stride.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name
pub const CONFIG_FILE: &str = "stride.yml";

/// Project configuration from stride.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory containing migration files
    #[serde(default = "default_migrations")]
    pub migrations: String,

    /// Database file path (DuckDB). Required for any command that connects.
    #[serde(default)]
    pub database: Option<String>,

    /// Schema the state tables live in; the database default when unset
    #[serde(default)]
    pub schema: Option<String>,

    /// SQL dialect used for parsing migration statements
    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// Migration ids never consumed by squash
    #[serde(default)]
    pub squash_exclude: Vec<String>,
}

fn default_migrations() -> String {
    "migrations".to_string()
}

fn default_dialect() -> String {
    "duckdb".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            migrations: default_migrations(),
            database: None,
            schema: None,
            dialect: default_dialect(),
            squash_exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a stride.yml file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
            message: e.to_string(),
        })
    }

    /// The migrations directory, relative paths resolved against `root`.
    pub fn migrations_dir(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.migrations);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }

    /// The configured database path, required for commands that connect.
    pub fn database_path(&self) -> CoreResult<&str> {
        self.database
            .as_deref()
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: "no 'database' configured; set it in stride.yml".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: Config = serde_yaml::from_str("database: state.duckdb\n").unwrap();
        assert_eq!(config.migrations, "migrations");
        assert_eq!(config.dialect, "duckdb");
        assert_eq!(config.database_path().unwrap(), "state.duckdb");
        assert!(config.schema.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Config, _> = serde_yaml::from_str("databse: oops\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_database_is_config_error() {
        let config = Config::default();
        assert!(matches!(
            config.database_path(),
            Err(CoreError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/stride.yml")).unwrap_err();
        assert!(matches!(err, CoreError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "migrations: db/migrations\ndatabase: app.duckdb\nschema: meta\nsquash_exclude:\n  - 20240101_01-init\n",
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.migrations, "db/migrations");
        assert_eq!(config.schema.as_deref(), Some("meta"));
        assert_eq!(config.squash_exclude, vec!["20240101_01-init"]);
        assert_eq!(
            config.migrations_dir(dir.path()),
            dir.path().join("db/migrations")
        );
    }
}
