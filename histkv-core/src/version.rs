//! Versions and ordered series

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::time::{TimeRange, Timestamp};

/// A single value of a key, as written at `timestamp`.
///
/// Serialized compactly as `{"d": <value>, "t": <timestamp>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    #[serde(rename = "d")]
    pub value: Value,
    #[serde(rename = "t")]
    pub timestamp: Timestamp,
}

impl Version {
    pub fn new<V: Into<Value>>(timestamp: Timestamp, value: V) -> Self {
        Self {
            value: value.into(),
            timestamp,
        }
    }
}

/// History of one key: versions in ascending timestamp order, no two
/// sharing a timestamp.
///
/// Every way of building a `Series` restores that ordering, so backends
/// may hand back versions in any order and consumers can rely on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series(Vec<Version>);

impl Series {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Normalize arbitrary versions into a series. For duplicate timestamps
    /// the first occurrence in `versions` is kept.
    pub fn from_versions(mut versions: Vec<Version>) -> Self {
        versions.sort_by_key(|v| v.timestamp);
        versions.dedup_by_key(|v| v.timestamp);
        Self(versions)
    }

    /// Build from a timestamp-keyed map, which is already ordered
    pub fn from_map(map: &BTreeMap<Timestamp, Value>) -> Self {
        Self(
            map.iter()
                .map(|(timestamp, value)| Version::new(*timestamp, value.clone()))
                .collect(),
        )
    }

    /// Legacy mapping form, keyed by timestamp
    pub fn to_map(&self) -> BTreeMap<Timestamp, Value> {
        self.0
            .iter()
            .map(|v| (v.timestamp, v.value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Version> {
        self.0.iter()
    }

    /// Versions whose timestamps fall inside `range`
    pub fn within(&self, range: TimeRange) -> Series {
        let lower = self.0.partition_point(|v| v.timestamp < range.start);
        let upper = self.0.partition_point(|v| v.timestamp <= range.end);
        Self(self.0[lower..upper.max(lower)].to_vec())
    }
}

impl FromIterator<Version> for Series {
    fn from_iter<I: IntoIterator<Item = Version>>(iter: I) -> Self {
        Self::from_versions(iter.into_iter().collect())
    }
}

impl IntoIterator for Series {
    type Item = Version;
    type IntoIter = std::vec::IntoIter<Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Version;
    type IntoIter = std::slice::Iter<'a, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<Version>::deserialize(deserializer).map(Series::from_versions)
    }
}
