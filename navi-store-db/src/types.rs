// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Record types for way topology and navigation data.

/// Number of rows seeded into the speed_limit table.
pub const SPEED_LIMIT_COUNT: u16 = 13;

const SPEED_BASE: u32 = 30;
const SPEED_STEP: u32 = 10;

/// A directed road segment.
///
/// This represents a row from the way table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Way {
    /// Unique way ID (assigned by the allocator)
    pub way_id: u64,
    /// Preceding way, if linked
    pub pre_way_id: Option<u64>,
    /// Following way, if linked
    pub next_way_id: Option<u64>,
    /// Lower bound, as an ID into speed_limit
    pub speed_min: Option<u8>,
    /// Upper bound, as an ID into speed_limit
    pub speed_max: Option<u8>,
}

impl Way {
    /// Build a way from producers that encode "absent" as `0`.
    pub fn from_sentinels(
        way_id: u64,
        pre_way_id: u64,
        next_way_id: u64,
        speed_min: u8,
        speed_max: u8,
    ) -> Self {
        Self {
            way_id,
            pre_way_id: non_zero(pre_way_id),
            next_way_id: non_zero(next_way_id),
            speed_min: non_zero(speed_min),
            speed_max: non_zero(speed_max),
        }
    }

    /// Flatten the optional fields back to the `0`-means-absent encoding.
    ///
    /// Returns `(pre_way_id, next_way_id, speed_min, speed_max)`.
    pub fn to_sentinels(&self) -> (u64, u64, u8, u8) {
        (
            self.pre_way_id.unwrap_or_default(),
            self.next_way_id.unwrap_or_default(),
            self.speed_min.unwrap_or_default(),
            self.speed_max.unwrap_or_default(),
        )
    }
}

/// Map the legacy `0` sentinel to `None`.
pub(crate) fn non_zero<T: Default + PartialEq>(value: T) -> Option<T> {
    (value != T::default()).then_some(value)
}

/// A row of the static speed_limit reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedLimit {
    /// 1..=13
    pub id: u16,
    /// Speed for this level
    pub speed: u32,
}

impl SpeedLimit {
    /// The reference rows seeded at initialization.
    pub fn seed() -> impl Iterator<Item = SpeedLimit> {
        (1..=SPEED_LIMIT_COUNT).map(|id| SpeedLimit {
            id,
            speed: SPEED_BASE + SPEED_STEP * u32::from(id - 1),
        })
    }
}

/// A single node of a way, as read from the source data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Position of the node within the way
    pub node_index: u64,
    /// Line in the source file the node came from
    pub data_line_number: u64,
    /// Raw node text
    pub node_value: String,
}

/// The ordered node list of one way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WayNodes {
    /// Owning way
    pub way_id: u64,
    /// Nodes in insertion order
    pub nodes: Vec<Node>,
}

/// Raw ingestion data and navigation bookkeeping for one way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WayData {
    /// Owning way
    pub way_id: u64,
    /// Opaque raw data blob
    pub raw_data: Vec<u8>,
    /// Number of derived navigation entries
    pub navi_number: u8,
    /// Partition holding this way's navigation rows
    pub navi_table_id: u64,
}

/// One derived navigation entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NaviData {
    pub navi_index: u8,
    pub data: Vec<u8>,
}

/// All navigation entries of one way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NaviInfo {
    pub way_id: u64,
    pub navi_data: Vec<NaviData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_limit_seed() {
        let seed: Vec<_> = SpeedLimit::seed().collect();
        assert_eq!(seed.len(), 13);
        assert_eq!(seed[0], SpeedLimit { id: 1, speed: 30 });
        assert_eq!(seed[12], SpeedLimit { id: 13, speed: 150 });
    }

    #[test]
    fn test_sentinel_roundtrip() {
        let way = Way::from_sentinels(3, 0, 4, 2, 0);
        assert_eq!(way.pre_way_id, None);
        assert_eq!(way.next_way_id, Some(4));
        assert_eq!(way.speed_min, Some(2));
        assert_eq!(way.speed_max, None);
        assert_eq!(way.to_sentinels(), (0, 4, 2, 0));
    }
}
