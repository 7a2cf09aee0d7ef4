// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Store configuration, read from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::connection::OpenMode;
use crate::error::{Error, Result};
use crate::schema::DATABASE_NAME;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "NAVI_STORE_CONFIG";

/// Rows a navigation-data partition may hold before the next one is used.
pub const DEFAULT_MAX_PARTITION_ROWS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,

    /// Partition row ceiling
    pub max_partition_rows: u64,

    /// How to open the database
    pub open_mode: OpenMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DATABASE_NAME),
            max_partition_rows: DEFAULT_MAX_PARTITION_ROWS,
            open_mode: OpenMode::Create,
        }
    }
}

impl StoreConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load from the file named by `NAVI_STORE_CONFIG`, or use defaults.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = StoreConfig::from_toml("max_partition_rows = 50\n").unwrap();
        assert_eq!(config.max_partition_rows, 50);
        assert_eq!(config.db_path, PathBuf::from("navi.sqlite"));
        assert_eq!(config.open_mode, OpenMode::Create);
    }

    #[test]
    fn test_open_mode_names() {
        let config = StoreConfig::from_toml(
            r#"
            db_path = "/tmp/navi.sqlite"
            open_mode = "read-only"
            "#,
        )
        .unwrap();
        assert_eq!(config.open_mode, OpenMode::ReadOnly);
        assert_eq!(config.db_path, PathBuf::from("/tmp/navi.sqlite"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = StoreConfig::from_toml("max_partition_rows = \"many\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreConfig::from_file(&dir.path().join("none.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
