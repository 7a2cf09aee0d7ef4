// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Database schema definitions and table lifecycle.
//!
//! Five fixed base tables plus any number of `navi_data_<id>` partitions,
//! which share the layout of `navi_data`.

use std::fmt;

use rusqlite::params;
use tracing::debug;

use crate::codec::speed_limit_from_row;
use crate::connection::NaviDb;
use crate::error::{Error, LogFailure, Result};
use crate::types::{SPEED_LIMIT_COUNT, SpeedLimit};

/// Default database file name.
pub const DATABASE_NAME: &str = "navi.sqlite";

/// The base tables of the navigation store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    SpeedLimit,
    Way,
    WayNodes,
    WayData,
    NaviData,
}

impl Table {
    /// All tables, in creation (dependency) order.
    pub const ALL: [Table; 5] = [
        Table::SpeedLimit,
        Table::Way,
        Table::WayNodes,
        Table::WayData,
        Table::NaviData,
    ];

    /// Name of the table in the database.
    pub const fn name(self) -> &'static str {
        match self {
            Table::SpeedLimit => "speed_limit",
            Table::Way => "way",
            Table::WayNodes => "way_nodes",
            Table::WayData => "way_data",
            Table::NaviData => "navi_data",
        }
    }

    fn ddl(self) -> String {
        match self {
            Table::SpeedLimit => SPEED_LIMIT_SQL.to_owned(),
            Table::Way => WAY_SQL.to_owned(),
            Table::WayNodes => WAY_NODES_SQL.to_owned(),
            Table::WayData => WAY_DATA_SQL.to_owned(),
            Table::NaviData => navi_data_sql(self.name(), false),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const SPEED_LIMIT_SQL: &str = r#"
create table speed_limit (
    id    integer primary key not null,
    speed integer not null
);
"#;

const WAY_SQL: &str = r#"
create table way (
    way_id      integer primary key not null,
    pre_way_id  integer,
    next_way_id integer,
    speed_min   integer references speed_limit(id) on update cascade,
    speed_max   integer references speed_limit(id) on update cascade
);
"#;

const WAY_NODES_SQL: &str = r#"
create table way_nodes (
    way_id           integer not null,
    node_index       integer not null,
    data_line_number integer not null,
    node_value       text not null,
    unique (way_id, node_index),
    foreign key (way_id) references way(way_id) on update cascade on delete cascade
);
"#;

const WAY_DATA_SQL: &str = r#"
create table way_data (
    way_id        integer primary key not null,
    raw_data      blob not null,
    navi_number   integer not null,
    navi_table_id integer not null,
    foreign key (way_id) references way(way_id) on update cascade on delete cascade
);

create index IndexNaviTableId on way_data(navi_table_id);
"#;

fn navi_data_sql(table: &str, if_not_exists: bool) -> String {
    let guard = if if_not_exists { "if not exists " } else { "" };
    format!(
        r#"
create table {guard}{table} (
    way_id     integer not null,
    navi_index integer not null,
    data       blob not null,
    unique (way_id, navi_index),
    foreign key (way_id) references way(way_id) on update cascade on delete cascade
);
"#
    )
}

/// Physical table name of a navigation-data partition.
///
/// Table names cannot be bound as parameters; the name is built from the
/// integer id alone.
pub fn partition_table_name(partition_id: u64) -> String {
    format!("navi_data_{partition_id}")
}

impl NaviDb {
    /// Check whether a base table exists.
    pub fn table_exists(&self, table: Table) -> Result<bool> {
        self.has_table(table.name()).log_failure("table_exists")
    }

    /// Check whether a navigation-data partition table exists.
    pub fn partition_exists(&self, partition_id: u64) -> Result<bool> {
        self.has_table(&partition_table_name(partition_id))
            .log_failure("partition_exists")
    }

    pub(crate) fn has_table(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Create one base table with its constraints.
    ///
    /// Fails if the table already exists.
    pub fn create_table(&self, table: Table) -> Result<()> {
        self.conn
            .execute_batch(&table.ddl())
            .log_failure("create_table")?;
        debug!(%table, "Created table");
        Ok(())
    }

    /// Create the navigation-data partition `navi_data_<partition_id>`.
    ///
    /// Does nothing if the partition already exists.
    pub fn create_navi_partition(&self, partition_id: u64) -> Result<()> {
        let name = partition_table_name(partition_id);
        self.conn
            .execute_batch(&navi_data_sql(&name, true))
            .log_failure("create_navi_partition")?;
        debug!(partition_id, "Created navigation partition");
        Ok(())
    }

    /// Create the schema unless it is already present.
    ///
    /// Presence is judged by the way table alone. Otherwise all base tables
    /// are created in dependency order and speed_limit is seeded. Table
    /// creation is not transactional: a failure part way leaves a partial
    /// schema that [`NaviDb::verify_schema`] reports.
    pub fn initialize(&mut self) -> Result<()> {
        if self.table_exists(Table::Way)? {
            debug!("Schema already present");
            return Ok(());
        }
        for table in Table::ALL {
            self.create_table(table)?;
        }
        self.seed_speed_limits().log_failure("initialize")?;
        debug!("Initialized database schema");
        Ok(())
    }

    fn seed_speed_limits(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO speed_limit (id, speed) VALUES (?1, ?2)")?;
            for limit in SpeedLimit::seed() {
                stmt.execute(params![limit.id, limit.speed])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Verify that every base table exists.
    pub fn verify_schema(&self) -> Result<()> {
        self.missing_tables().log_failure("verify_schema")
    }

    fn missing_tables(&self) -> Result<()> {
        let mut missing = Vec::new();
        for table in Table::ALL {
            if !self.has_table(table.name())? {
                missing.push(table.name());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::IncompleteSchema { missing })
        }
    }

    /// Read the speed_limit reference table, ordered by id.
    pub fn speed_limits(&self) -> Result<Vec<SpeedLimit>> {
        self.speed_limit_rows().log_failure("speed_limits")
    }

    fn speed_limit_rows(&self) -> Result<Vec<SpeedLimit>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id, speed FROM speed_limit ORDER BY id")?;

        let mut limits = Vec::with_capacity(usize::from(SPEED_LIMIT_COUNT));
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            limits.push(speed_limit_from_row(row)?);
        }
        Ok(limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        let names: Vec<_> = Table::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            ["speed_limit", "way", "way_nodes", "way_data", "navi_data"]
        );
    }

    #[test]
    fn test_partition_table_name() {
        assert_eq!(partition_table_name(0), "navi_data_0");
        assert_eq!(partition_table_name(12), "navi_data_12");
    }

    #[test_log::test]
    fn test_partial_schema_is_reported() {
        let db = NaviDb::open_memory_uninitialized().unwrap();
        db.create_table(Table::SpeedLimit).unwrap();
        db.create_table(Table::Way).unwrap();

        let err = db.verify_schema().unwrap_err();
        assert!(matches!(
            err,
            Error::IncompleteSchema { ref missing }
                if missing == &["way_nodes", "way_data", "navi_data"]
        ));
    }

    #[test_log::test]
    fn test_create_existing_table_fails() {
        let db = NaviDb::open_memory().unwrap();
        assert!(db.create_table(Table::Way).is_err());
    }

    #[test_log::test]
    fn test_create_navi_partition_is_idempotent() {
        let db = NaviDb::open_memory().unwrap();
        assert!(!db.partition_exists(3).unwrap());
        db.create_navi_partition(3).unwrap();
        db.create_navi_partition(3).unwrap();
        assert!(db.partition_exists(3).unwrap());
    }

    #[test_log::test]
    fn test_speed_limits_without_schema_fails() {
        let db = NaviDb::open_memory_uninitialized().unwrap();
        assert!(matches!(db.speed_limits(), Err(Error::Sqlite(_))));
    }
}
