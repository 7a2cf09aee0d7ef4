// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Read query operations for the navigation store.
//!
//! Point lookups return `Ok(None)` when nothing matches; `Err` is reserved
//! for statement failures.

use rusqlite::{OptionalExtension, params};

use crate::codec::{navi_data_from_row, node_from_row, sql_id, way_data_from_row, way_from_row};
use crate::connection::NaviDb;
use crate::error::{LogFailure, Result};
use crate::schema::{Table, partition_table_name};
use crate::types::{NaviData, Node, Way, WayData, WayNodes};

impl NaviDb {
    /// Query a way by ID.
    pub fn query_way(&self, way_id: u64) -> Result<Option<Way>> {
        self.way_row(way_id).log_failure("query_way")
    }

    fn way_row(&self, way_id: u64) -> Result<Option<Way>> {
        let id = sql_id("way_id", way_id)?;
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT way_id, pre_way_id, next_way_id, speed_min, speed_max
            FROM way
            WHERE way_id = ?1
            "#,
        )?;

        Ok(stmt.query_row(params![id], way_from_row).optional()?)
    }

    /// Query the raw data row of a way.
    pub fn query_way_data(&self, way_id: u64) -> Result<Option<WayData>> {
        self.way_data_row(way_id).log_failure("query_way_data")
    }

    fn way_data_row(&self, way_id: u64) -> Result<Option<WayData>> {
        let id = sql_id("way_id", way_id)?;
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT way_id, raw_data, navi_number, navi_table_id
            FROM way_data
            WHERE way_id = ?1
            "#,
        )?;

        Ok(stmt.query_row(params![id], way_data_from_row).optional()?)
    }

    /// Query the nodes of a way, in storage order.
    ///
    /// Returns `None` if the way has no nodes.
    pub fn query_way_nodes(&self, way_id: u64) -> Result<Option<WayNodes>> {
        let nodes = self.node_rows(way_id).log_failure("query_way_nodes")?;
        if nodes.is_empty() {
            return Ok(None);
        }
        Ok(Some(WayNodes { way_id, nodes }))
    }

    fn node_rows(&self, way_id: u64) -> Result<Vec<Node>> {
        let id = sql_id("way_id", way_id)?;
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT node_index, data_line_number, node_value
            FROM way_nodes
            WHERE way_id = ?1
            "#,
        )?;

        let mut nodes = Vec::new();
        let mut rows = stmt.query(params![id])?;
        while let Some(row) = rows.next()? {
            nodes.push(node_from_row(row)?);
        }
        Ok(nodes)
    }

    /// Get all navi_data entries of a way, in storage order.
    pub fn query_navi_data(&self, way_id: u64) -> Result<Vec<NaviData>> {
        self.navi_rows(Table::NaviData.name(), way_id)
            .log_failure("query_navi_data")
    }

    /// Get all entries of a way from a navigation-data partition.
    pub fn query_partition_navi_data(
        &self,
        partition_id: u64,
        way_id: u64,
    ) -> Result<Vec<NaviData>> {
        self.navi_rows(&partition_table_name(partition_id), way_id)
            .log_failure("query_partition_navi_data")
    }

    fn navi_rows(&self, table: &str, way_id: u64) -> Result<Vec<NaviData>> {
        let id = sql_id("way_id", way_id)?;
        let sql = format!("SELECT navi_index, data FROM {table} WHERE way_id = ?1");
        let mut stmt = self.conn.prepare_cached(&sql)?;

        let mut entries = Vec::new();
        let mut rows = stmt.query(params![id])?;
        while let Some(row) = rows.next()? {
            entries.push(navi_data_from_row(row)?);
        }
        Ok(entries)
    }

    /// Query a single navi_data entry of a way.
    pub fn query_navi_data_entry(&self, way_id: u64, navi_index: u8) -> Result<Option<NaviData>> {
        self.navi_entry_row(way_id, navi_index)
            .log_failure("query_navi_data_entry")
    }

    fn navi_entry_row(&self, way_id: u64, navi_index: u8) -> Result<Option<NaviData>> {
        let id = sql_id("way_id", way_id)?;
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT navi_index, data
            FROM navi_data
            WHERE way_id = ?1 AND navi_index = ?2
            "#,
        )?;

        Ok(stmt
            .query_row(params![id, navi_index], navi_data_from_row)
            .optional()?)
    }
}
