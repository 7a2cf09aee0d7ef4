// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Error types for navigation store operations.

use std::path::PathBuf;

use thiserror::Error;
use tracing::error;

/// Result type for navigation store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during navigation store operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to open database with context
    #[error("Failed to open database at '{path}': {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Database file not found
    #[error("Database not found at: {0}")]
    DatabaseNotFound(PathBuf),

    /// One or more base tables are missing
    #[error("Incomplete schema, missing tables: {}", missing.join(", "))]
    IncompleteSchema { missing: Vec<&'static str> },

    /// A row of a batch insert failed; the whole batch was rolled back
    #[error("Batch insert into {table} for way {way_id} failed at row {row}: {source}")]
    Batch {
        table: String,
        way_id: u64,
        row: usize,
        #[source]
        source: rusqlite::Error,
    },

    /// Identifier does not fit into an SQLite integer
    #[error("{field} value {value} exceeds SQLite i64 range")]
    IdOutOfRange { field: &'static str, value: u64 },

    /// Failed to read the configuration file
    #[error("Failed to read config file at '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Helper trait for logging a failed operation before handing the error back.
pub(crate) trait LogFailure<T> {
    fn log_failure(self, op: &'static str) -> Result<T>;
}

impl<T, E: Into<Error>> LogFailure<T> for std::result::Result<T, E> {
    fn log_failure(self, op: &'static str) -> Result<T> {
        self.map_err(|e| {
            let e = e.into();
            error!(op, "{e}");
            e
        })
    }
}
