// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Write operations for the navigation store.
//!
//! Multi-row writes and composite updates run inside a single transaction;
//! dropping an uncommitted [`Transaction`] rolls it back, so a failure at
//! any row leaves the tables as they were before the call.

use rusqlite::{Connection, Transaction, params_from_iter};
use tracing::{debug, warn};

use crate::codec::{
    Bind, navi_values, node_values, speed_values, sql_id, way_data_values, way_values,
};
use crate::connection::NaviDb;
use crate::error::{Error, LogFailure, Result};
use crate::schema::{Table, partition_table_name};
use crate::types::{NaviData, NaviInfo, Node, Way, WayData, WayNodes};

const INSERT_WAY_SQL: &str = r#"
INSERT INTO way (way_id, pre_way_id, next_way_id, speed_min, speed_max)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

const UPDATE_WAY_SQL: &str = r#"
UPDATE way SET pre_way_id = ?2, next_way_id = ?3, speed_min = ?4, speed_max = ?5
WHERE way_id = ?1
"#;

const UPDATE_SPEED_SQL: &str = "UPDATE way SET speed_min = ?2, speed_max = ?3 WHERE way_id = ?1";

const INSERT_NODE_SQL: &str = r#"
INSERT INTO way_nodes (way_id, node_index, data_line_number, node_value)
VALUES (?1, ?2, ?3, ?4)
"#;

const INSERT_WAY_DATA_SQL: &str = r#"
INSERT INTO way_data (way_id, raw_data, navi_number, navi_table_id)
VALUES (?1, ?2, ?3, ?4)
"#;

const UPDATE_WAY_DATA_SQL: &str = r#"
UPDATE way_data SET raw_data = ?2, navi_number = ?3, navi_table_id = ?4
WHERE way_id = ?1
"#;

fn execute_values(conn: &Connection, sql: &str, values: &[Bind<'_>]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(sql)?;
    Ok(stmt.execute(params_from_iter(values))?)
}

/// Insert one row per item with a single prepared statement.
///
/// Stops at the first failing row. A row that cannot be encoded fails the
/// batch like a rejected insert.
fn insert_rows<'a, T, const N: usize>(
    conn: &Connection,
    table: &str,
    sql: &str,
    way_id: u64,
    items: &'a [T],
    encode: impl Fn(u64, &'a T) -> Result<[Bind<'a>; N]>,
) -> Result<()> {
    let mut stmt = conn.prepare_cached(sql)?;
    for (row, item) in items.iter().enumerate() {
        encode(way_id, item)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
            .and_then(|values| stmt.execute(params_from_iter(values.iter())))
            .map_err(|source| {
                warn!(table, way_id, row, "Batch row failed, rolling back");
                Error::Batch {
                    table: table.to_owned(),
                    way_id,
                    row,
                    source,
                }
            })?;
    }
    Ok(())
}

fn insert_nodes(conn: &Connection, way_id: u64, nodes: &[Node]) -> Result<()> {
    insert_rows(
        conn,
        Table::WayNodes.name(),
        INSERT_NODE_SQL,
        way_id,
        nodes,
        node_values,
    )
}

fn insert_navi(conn: &Connection, table: &str, way_id: u64, navi: &[NaviData]) -> Result<()> {
    let sql = format!("INSERT INTO {table} (way_id, navi_index, data) VALUES (?1, ?2, ?3)");
    insert_rows(conn, table, &sql, way_id, navi, navi_values)
}

fn delete_children(conn: &Connection, table: Table, way_id: u64) -> Result<usize> {
    let sql = format!("DELETE FROM {table} WHERE way_id = ?1");
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt.execute([sql_id("way_id", way_id)?])?)
}

impl NaviDb {
    /// Run `f` in a transaction, committing only if it succeeds.
    fn in_transaction<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let run = |conn: &mut Connection| -> Result<T> {
            let tx = conn.transaction()?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        };
        run(&mut self.conn).log_failure(op)
    }

    /// Insert a new way.
    pub fn save_way(&self, way: &Way) -> Result<()> {
        let values = way_values(way.way_id, way).log_failure("save_way")?;
        execute_values(&self.conn, INSERT_WAY_SQL, &values).log_failure("save_way")?;
        Ok(())
    }

    /// Insert all nodes of a way, all or nothing.
    pub fn save_way_nodes(&mut self, way_nodes: &WayNodes) -> Result<()> {
        self.in_transaction("save_way_nodes", |tx| {
            insert_nodes(tx, way_nodes.way_id, &way_nodes.nodes)
        })?;
        debug!(
            way_id = way_nodes.way_id,
            rows = way_nodes.nodes.len(),
            "Saved way nodes"
        );
        Ok(())
    }

    /// Insert the raw data row of a way.
    pub fn save_way_data(&self, way_data: &WayData) -> Result<()> {
        let values = way_data_values(way_data.way_id, way_data).log_failure("save_way_data")?;
        execute_values(&self.conn, INSERT_WAY_DATA_SQL, &values).log_failure("save_way_data")?;
        Ok(())
    }

    /// Insert all navigation entries of a way into navi_data, all or nothing.
    pub fn save_navi_data(&mut self, navi_info: &NaviInfo) -> Result<()> {
        self.in_transaction("save_navi_data", |tx| {
            insert_navi(
                tx,
                Table::NaviData.name(),
                navi_info.way_id,
                &navi_info.navi_data,
            )
        })
    }

    /// Insert all navigation entries of a way into a partition, all or nothing.
    ///
    /// The partition must have been created with
    /// [`NaviDb::create_navi_partition`].
    pub fn save_partition_navi_data(
        &mut self,
        partition_id: u64,
        navi_info: &NaviInfo,
    ) -> Result<()> {
        let table = partition_table_name(partition_id);
        self.in_transaction("save_partition_navi_data", |tx| {
            insert_navi(tx, &table, navi_info.way_id, &navi_info.navi_data)
        })
    }

    /// Replace the links and speed limits of a way.
    ///
    /// Returns `false` if no way has this ID.
    pub fn update_way(&self, way_id: u64, way: &Way) -> Result<bool> {
        let values = way_values(way_id, way).log_failure("update_way")?;
        let rows = execute_values(&self.conn, UPDATE_WAY_SQL, &values).log_failure("update_way")?;
        Ok(rows > 0)
    }

    /// Replace only the speed limits of a way.
    pub fn update_way_speed_limit(
        &self,
        way_id: u64,
        speed_min: Option<u8>,
        speed_max: Option<u8>,
    ) -> Result<bool> {
        let values =
            speed_values(way_id, speed_min, speed_max).log_failure("update_way_speed_limit")?;
        let rows = execute_values(&self.conn, UPDATE_SPEED_SQL, &values)
            .log_failure("update_way_speed_limit")?;
        Ok(rows > 0)
    }

    /// Replace the node set of a way.
    ///
    /// Old nodes are removed and the new ones inserted in one transaction,
    /// so the old set survives if any insert fails.
    pub fn update_way_nodes(&mut self, way_id: u64, way_nodes: &WayNodes) -> Result<()> {
        self.in_transaction("update_way_nodes", |tx| {
            delete_children(tx, Table::WayNodes, way_id)?;
            insert_nodes(tx, way_id, &way_nodes.nodes)
        })
    }

    /// Replace the raw data row of a way.
    pub fn update_way_data(&self, way_id: u64, way_data: &WayData) -> Result<bool> {
        let values = way_data_values(way_id, way_data).log_failure("update_way_data")?;
        let rows = execute_values(&self.conn, UPDATE_WAY_DATA_SQL, &values)
            .log_failure("update_way_data")?;
        Ok(rows > 0)
    }

    /// Replace the navigation entries of a way in navi_data.
    pub fn update_navi_data(&mut self, way_id: u64, navi_info: &NaviInfo) -> Result<()> {
        self.in_transaction("update_navi_data", |tx| {
            delete_children(tx, Table::NaviData, way_id)?;
            insert_navi(tx, Table::NaviData.name(), way_id, &navi_info.navi_data)
        })
    }

    /// Delete a way together with its nodes, raw data and navigation entries.
    ///
    /// All deletes share one transaction. Returns `false` if no way row
    /// had this ID.
    pub fn delete_way(&mut self, way_id: u64) -> Result<bool> {
        let removed = self.in_transaction("delete_way", |tx| {
            let removed = delete_children(tx, Table::Way, way_id)?;
            for table in [Table::WayNodes, Table::WayData, Table::NaviData] {
                delete_children(tx, table, way_id)?;
            }
            Ok(removed > 0)
        })?;
        debug!(way_id, removed, "Deleted way");
        Ok(removed)
    }

    /// Delete all nodes of a way. Returns the number of rows removed.
    pub fn delete_way_nodes(&self, way_id: u64) -> Result<usize> {
        delete_children(&self.conn, Table::WayNodes, way_id).log_failure("delete_way_nodes")
    }

    /// Delete the raw data row of a way.
    pub fn delete_way_data(&self, way_id: u64) -> Result<usize> {
        delete_children(&self.conn, Table::WayData, way_id).log_failure("delete_way_data")
    }

    /// Delete the navi_data entries of a way.
    pub fn delete_navi_data(&self, way_id: u64) -> Result<usize> {
        delete_children(&self.conn, Table::NaviData, way_id).log_failure("delete_navi_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_way(way_id: u64) -> NaviDb {
        let db = NaviDb::open_memory().unwrap();
        db.save_way(&Way {
            way_id,
            ..Default::default()
        })
        .unwrap();
        db
    }

    fn node(index: u64) -> Node {
        Node {
            node_index: index,
            data_line_number: index + 100,
            node_value: format!("node-{index}"),
        }
    }

    #[test_log::test]
    fn test_update_missing_way() {
        let db = NaviDb::open_memory().unwrap();
        assert!(!db.update_way(42, &Way::default()).unwrap());
        assert!(!db.update_way_speed_limit(42, Some(1), Some(2)).unwrap());
    }

    #[test_log::test]
    fn test_batch_error_reports_row() {
        let mut db = db_with_way(1);
        let way_nodes = WayNodes {
            way_id: 1,
            nodes: vec![node(0), node(1), node(1)],
        };
        let err = db.save_way_nodes(&way_nodes).unwrap_err();
        assert!(matches!(
            err,
            Error::Batch { ref table, way_id: 1, row: 2, .. } if table == "way_nodes"
        ));
    }

    #[test_log::test]
    fn test_nodes_for_unknown_way_rejected() {
        let mut db = NaviDb::open_memory().unwrap();
        let way_nodes = WayNodes {
            way_id: 99,
            nodes: vec![node(0)],
        };
        assert!(db.save_way_nodes(&way_nodes).is_err());
    }

    #[test_log::test]
    fn test_speed_outside_reference_table_rejected() {
        let db = NaviDb::open_memory().unwrap();
        let way = Way {
            way_id: 1,
            speed_max: Some(14),
            ..Default::default()
        };
        assert!(db.save_way(&way).is_err());
    }

    #[test_log::test]
    fn test_per_table_deletes() {
        let mut db = db_with_way(1);
        db.save_way_nodes(&WayNodes {
            way_id: 1,
            nodes: vec![node(0), node(1)],
        })
        .unwrap();
        assert_eq!(db.delete_way_nodes(1).unwrap(), 2);
        assert_eq!(db.delete_way_nodes(1).unwrap(), 0);
        assert_eq!(db.delete_way_data(1).unwrap(), 0);
        assert_eq!(db.delete_navi_data(1).unwrap(), 0);
    }

    #[test_log::test]
    fn test_unencodable_row_fails_batch() {
        let mut db = db_with_way(1);
        let way_nodes = WayNodes {
            way_id: 1,
            nodes: vec![
                node(0),
                Node {
                    node_index: u64::MAX,
                    data_line_number: 0,
                    node_value: String::new(),
                },
            ],
        };
        let err = db.save_way_nodes(&way_nodes).unwrap_err();
        assert!(matches!(
            err,
            Error::Batch {
                row: 1,
                source: rusqlite::Error::ToSqlConversionFailure(_),
                ..
            }
        ));
        assert!(db.query_way_nodes(1).unwrap().is_none());
    }
}
