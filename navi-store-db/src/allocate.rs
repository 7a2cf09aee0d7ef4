// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Way ID allocation and navigation-data partition selection.
//!
//! Both assume a single writer: nothing is reserved between reading the
//! current maximum and the caller's insert.

use tracing::debug;

use crate::codec::{max_from_row, sql_id};
use crate::connection::NaviDb;
use crate::error::{LogFailure, Result};
use crate::schema::partition_table_name;

impl NaviDb {
    /// Next way ID: one past the largest stored ID, or 1 for an empty table.
    pub fn create_new_way_id(&self) -> Result<u64> {
        let max = self
            .conn
            .query_row("SELECT max(way_id) FROM way", [], max_from_row)
            .log_failure("create_new_way_id")?;
        let next = max.map_or(1, |id| id + 1);
        sql_id("way_id", next).log_failure("create_new_way_id")?;
        Ok(next)
    }

    /// Partition that new navigation rows should go to.
    ///
    /// The current partition is the largest `navi_table_id` in way_data
    /// (0 if none). Once it holds [`NaviDb::max_partition_rows`] rows the next
    /// ID is returned; creating that partition is up to the caller.
    pub fn navi_table_id(&self) -> Result<u64> {
        let current = self
            .conn
            .query_row("SELECT max(navi_table_id) FROM way_data", [], max_from_row)
            .log_failure("navi_table_id")?
            .unwrap_or(0);
        let rows = self.count_partition_rows(current)?;

        let id = if rows < self.max_partition_rows {
            current
        } else {
            current + 1
        };
        debug!(current, rows, id, "Selected navigation partition");
        Ok(id)
    }

    /// Number of rows in `navi_data_<partition_id>`.
    ///
    /// A partition that has not been created yet counts as empty.
    pub fn count_partition_rows(&self, partition_id: u64) -> Result<u64> {
        let table = partition_table_name(partition_id);
        if !self.has_table(&table).log_failure("count_partition_rows")? {
            return Ok(0);
        }
        let count = self
            .conn
            .query_row(&format!("SELECT count(*) FROM {table}"), [], max_from_row)
            .log_failure("count_partition_rows")?;
        Ok(count.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Way, WayData};

    #[test_log::test]
    fn test_first_way_id() {
        let db = NaviDb::open_memory().unwrap();
        assert_eq!(db.create_new_way_id().unwrap(), 1);
    }

    #[test_log::test]
    fn test_missing_partition_counts_as_empty() {
        let db = NaviDb::open_memory().unwrap();
        assert_eq!(db.count_partition_rows(0).unwrap(), 0);
        assert_eq!(db.navi_table_id().unwrap(), 0);
    }

    #[test_log::test]
    fn test_current_partition_from_way_data() {
        let db = NaviDb::open_memory().unwrap();
        db.save_way(&Way {
            way_id: 1,
            ..Default::default()
        })
        .unwrap();
        db.save_way_data(&WayData {
            way_id: 1,
            raw_data: vec![0xab],
            navi_number: 0,
            navi_table_id: 3,
        })
        .unwrap();
        assert_eq!(db.navi_table_id().unwrap(), 3);
    }

    #[test_log::test]
    fn test_zero_ceiling_always_rolls_over() {
        let mut db = NaviDb::open_memory().unwrap();
        db.set_max_partition_rows(0);
        assert_eq!(db.navi_table_id().unwrap(), 1);
    }
}
