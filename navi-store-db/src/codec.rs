// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Mapping between records and statement parameters / result rows.
//!
//! Bind arrays are ordered the way the statements in `write.rs` number their
//! parameters, with the owning `way_id` always at `?1`. Optional references
//! bind SQL `NULL` when absent; a literal `0` is never written to those
//! columns since it would read back as a real value.

use rusqlite::Row;
use rusqlite::types::{ToSqlOutput, Type, Value, ValueRef};

use crate::error::{Error, Result};
use crate::types::{NaviData, Node, SpeedLimit, Way, WayData, non_zero};

/// A single bound statement parameter.
pub(crate) type Bind<'a> = ToSqlOutput<'a>;

/// Convert an unsigned identifier to an SQLite integer.
pub(crate) fn sql_id(field: &'static str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::IdOutOfRange { field, value })
}

fn integer(field: &'static str, value: u64) -> Result<Bind<'static>> {
    Ok(ToSqlOutput::Owned(Value::Integer(sql_id(field, value)?)))
}

fn optional_id(field: &'static str, value: Option<u64>) -> Result<Bind<'static>> {
    match value.and_then(non_zero) {
        Some(v) => integer(field, v),
        None => Ok(ToSqlOutput::Owned(Value::Null)),
    }
}

fn optional_speed(value: Option<u8>) -> Bind<'static> {
    ToSqlOutput::Owned(
        value
            .and_then(non_zero)
            .map_or(Value::Null, |v| Value::Integer(i64::from(v))),
    )
}

fn blob(data: &[u8]) -> Bind<'_> {
    ToSqlOutput::Borrowed(ValueRef::Blob(data))
}

/// `(way_id, pre_way_id, next_way_id, speed_min, speed_max)`
pub(crate) fn way_values(way_id: u64, way: &Way) -> Result<[Bind<'static>; 5]> {
    Ok([
        integer("way_id", way_id)?,
        optional_id("pre_way_id", way.pre_way_id)?,
        optional_id("next_way_id", way.next_way_id)?,
        optional_speed(way.speed_min),
        optional_speed(way.speed_max),
    ])
}

/// `(way_id, speed_min, speed_max)`
pub(crate) fn speed_values(
    way_id: u64,
    speed_min: Option<u8>,
    speed_max: Option<u8>,
) -> Result<[Bind<'static>; 3]> {
    Ok([
        integer("way_id", way_id)?,
        optional_speed(speed_min),
        optional_speed(speed_max),
    ])
}

/// `(way_id, node_index, data_line_number, node_value)`
pub(crate) fn node_values(way_id: u64, node: &Node) -> Result<[Bind<'_>; 4]> {
    Ok([
        integer("way_id", way_id)?,
        integer("node_index", node.node_index)?,
        integer("data_line_number", node.data_line_number)?,
        ToSqlOutput::Borrowed(ValueRef::Text(node.node_value.as_bytes())),
    ])
}

/// `(way_id, raw_data, navi_number, navi_table_id)`
pub(crate) fn way_data_values(way_id: u64, way_data: &WayData) -> Result<[Bind<'_>; 4]> {
    Ok([
        integer("way_id", way_id)?,
        blob(&way_data.raw_data),
        ToSqlOutput::Owned(Value::Integer(i64::from(way_data.navi_number))),
        integer("navi_table_id", way_data.navi_table_id)?,
    ])
}

/// `(way_id, navi_index, data)`
pub(crate) fn navi_values(way_id: u64, navi: &NaviData) -> Result<[Bind<'_>; 3]> {
    Ok([
        integer("way_id", way_id)?,
        ToSqlOutput::Owned(Value::Integer(i64::from(navi.navi_index))),
        blob(&navi.data),
    ])
}

fn read_u64(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(idx)?;
    u64::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, value))
}

fn is_null(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    Ok(row.get_ref(idx)?.data_type() == Type::Null)
}

fn read_optional_u64(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<u64>> {
    if is_null(row, idx)? {
        return Ok(None);
    }
    read_u64(row, idx).map(Some)
}

fn read_optional_u8(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<u8>> {
    if is_null(row, idx)? {
        return Ok(None);
    }
    row.get(idx).map(Some)
}

/// Decode a single aggregate column such as `max(way_id)`; `NULL` is `None`.
pub(crate) fn max_from_row(row: &Row<'_>) -> rusqlite::Result<Option<u64>> {
    read_optional_u64(row, 0)
}

/// Decode `way_id, pre_way_id, next_way_id, speed_min, speed_max`.
pub(crate) fn way_from_row(row: &Row<'_>) -> rusqlite::Result<Way> {
    Ok(Way {
        way_id: read_u64(row, 0)?,
        pre_way_id: read_optional_u64(row, 1)?,
        next_way_id: read_optional_u64(row, 2)?,
        speed_min: read_optional_u8(row, 3)?,
        speed_max: read_optional_u8(row, 4)?,
    })
}

/// Decode `way_id, raw_data, navi_number, navi_table_id`.
pub(crate) fn way_data_from_row(row: &Row<'_>) -> rusqlite::Result<WayData> {
    Ok(WayData {
        way_id: read_u64(row, 0)?,
        raw_data: row.get(1)?,
        navi_number: row.get(2)?,
        navi_table_id: read_u64(row, 3)?,
    })
}

/// Decode `node_index, data_line_number, node_value`.
pub(crate) fn node_from_row(row: &Row<'_>) -> rusqlite::Result<Node> {
    Ok(Node {
        node_index: read_u64(row, 0)?,
        data_line_number: read_u64(row, 1)?,
        node_value: row.get(2)?,
    })
}

/// Decode `navi_index, data`.
pub(crate) fn navi_data_from_row(row: &Row<'_>) -> rusqlite::Result<NaviData> {
    Ok(NaviData {
        navi_index: row.get(0)?,
        data: row.get(1)?,
    })
}

/// Decode `id, speed`.
pub(crate) fn speed_limit_from_row(row: &Row<'_>) -> rusqlite::Result<SpeedLimit> {
    Ok(SpeedLimit {
        id: row.get(0)?,
        speed: row.get(1)?,
    })
}
