// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Database connection management.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DEFAULT_MAX_PARTITION_ROWS, StoreConfig};
use crate::error::{Error, Result};

/// Database open mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenMode {
    /// Read-only access (for inspecting a finished database)
    ReadOnly,
    /// Read-write access to an existing database
    ReadWrite,
    /// Create new database if it doesn't exist
    #[default]
    Create,
}

/// SQLite database connection for way topology and navigation data.
///
/// The connection is opened on construction and closed on drop. It is not
/// meant to be shared between writers.
pub struct NaviDb {
    pub(crate) conn: Connection,
    pub(crate) max_partition_rows: u64,
}

impl NaviDb {
    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            max_partition_rows: DEFAULT_MAX_PARTITION_ROWS,
        }
    }

    /// Open or create a database at a custom path.
    ///
    /// The schema is not touched; call [`NaviDb::initialize`] before use.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        let flags = match mode {
            OpenMode::ReadOnly => {
                if !path.exists() {
                    return Err(Error::DatabaseNotFound(path.to_owned()));
                }
                OpenFlags::SQLITE_OPEN_READ_ONLY
            }
            OpenMode::ReadWrite => {
                if !path.exists() {
                    return Err(Error::DatabaseNotFound(path.to_owned()));
                }
                OpenFlags::SQLITE_OPEN_READ_WRITE
            }
            OpenMode::Create => OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        };

        let conn = Connection::open_with_flags(path, flags).map_err(|e| Error::DatabaseOpen {
            path: path.to_owned(),
            source: e,
        })?;
        let db = Self::from_connection(conn);

        if mode == OpenMode::ReadOnly {
            db.enable_foreign_keys()?;
        } else {
            db.configure_pragmas()?;
        }

        debug!("Opened database at {} ({:?})", path.display(), mode);
        Ok(db)
    }

    /// Open the database described by `config`.
    ///
    /// Writable databases are initialized.
    pub fn open_with_config(config: &StoreConfig) -> Result<Self> {
        let mut db = Self::open(&config.db_path, config.open_mode)?;
        db.max_partition_rows = config.max_partition_rows;
        if config.open_mode != OpenMode::ReadOnly {
            db.initialize()?;
        }
        Ok(db)
    }

    /// Create an in-memory database (for testing).
    ///
    /// The database is initialized with the full schema.
    pub fn open_memory() -> Result<Self> {
        let mut db = Self::open_memory_uninitialized()?;
        db.initialize()?;
        debug!("Created in-memory database");
        Ok(db)
    }

    /// Create an empty in-memory database without any tables.
    pub fn open_memory_uninitialized() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self::from_connection(conn);
        db.configure_pragmas()?;
        Ok(db)
    }

    /// Configure SQLite pragmas for bulk writes.
    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            "#,
        )?;
        Ok(())
    }

    fn enable_foreign_keys(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", true)?;
        Ok(())
    }

    /// Row ceiling after which [`NaviDb::navi_table_id`] moves to a new partition.
    pub fn max_partition_rows(&self) -> u64 {
        self.max_partition_rows
    }

    /// Override the partition row ceiling.
    pub fn set_max_partition_rows(&mut self, rows: u64) {
        self.max_partition_rows = rows;
    }

    /// Get raw connection (for advanced usage).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
