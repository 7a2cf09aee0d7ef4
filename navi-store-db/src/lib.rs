// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! SQLite persistence for way topology and navigation data.
//!
//! This crate stores the road segments ("ways") of an offline map-processing
//! pipeline together with their nodes, raw ingestion data and derived
//! navigation entries, all in a single SQLite file.
//!
//! # Key Features
//!
//! - Fixed five-table schema (`speed_limit`, `way`, `way_nodes`, `way_data`,
//!   `navi_data`) with cascading foreign keys
//! - All-or-nothing batch writes and composite updates
//! - Lookups that tell "not found" apart from failures
//! - Way ID allocation and navigation-data partition rollover
//! - In-memory database for testing
//!
//! # Example
//!
//! ```ignore
//! use navi_store_db::{NaviDb, OpenMode, Way};
//!
//! let mut db = NaviDb::open("navi.sqlite", OpenMode::Create)?;
//! db.initialize()?;
//!
//! let way_id = db.create_new_way_id()?;
//! db.save_way(&Way { way_id, speed_max: Some(5), ..Default::default() })?;
//!
//! if let Some(way) = db.query_way(way_id)? {
//!     println!("next: {:?}", way.next_way_id);
//! }
//! ```

mod allocate;
mod codec;
mod config;
mod connection;
mod error;
mod query;
mod schema;
mod types;
mod write;

pub use config::{CONFIG_ENV, DEFAULT_MAX_PARTITION_ROWS, StoreConfig};
pub use connection::{NaviDb, OpenMode};
pub use error::{Error, Result};
pub use schema::{DATABASE_NAME, Table, partition_table_name};
pub use types::*;
