//! In-memory reference backend

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::resample::{resample, ResamplePolicy};
use crate::store::{VersionedStore, WritableStore};
use crate::time::{now_millis, Interval, TimeRange, Timestamp};
use crate::version::{Series, Version};

/// Serialized form of a whole store: each key with its versions
pub type Snapshot = HashMap<String, Series>;

/// Versioned store kept entirely in memory.
///
/// Each key owns a `BTreeMap` from timestamp to value, so ordered range
/// scans are direct. Readers share a lock; a write only blocks for the
/// duration of one map insert.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<HashMap<String, BTreeMap<Timestamp, Value>>>,
    policy: ResamplePolicy,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that resamples interval reads with `policy`
    pub fn with_policy(policy: ResamplePolicy) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            policy,
        }
    }

    /// Create a store pre-populated from a snapshot
    pub fn from_snapshot(snapshot: Snapshot, policy: ResamplePolicy) -> Self {
        let data = snapshot
            .into_iter()
            .map(|(key, series)| {
                let versions = series
                    .into_iter()
                    .map(|v| (v.timestamp, v.value))
                    .collect::<BTreeMap<_, _>>();
                (key, versions)
            })
            .collect();

        Self {
            data: RwLock::new(data),
            policy,
        }
    }

    /// Load a JSON snapshot file of the form `{"key": [{"d": .., "t": ..}, ..]}`
    pub fn load_snapshot<P: AsRef<Path>>(path: P, policy: ResamplePolicy) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        let versions: usize = snapshot.values().map(Series::len).sum();
        info!(
            "Loaded {} keys ({} versions) from {}",
            snapshot.len(),
            versions,
            path.as_ref().display()
        );
        Ok(Self::from_snapshot(snapshot, policy))
    }

    /// Current contents of the store
    pub fn snapshot(&self) -> Snapshot {
        self.data
            .read()
            .iter()
            .map(|(key, versions)| (key.clone(), Series::from_map(versions)))
            .collect()
    }

    pub fn policy(&self) -> ResamplePolicy {
        self.policy
    }

    /// Number of keys with at least one version
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn scan(&self, key: &str, range: TimeRange) -> StoreResult<Series> {
        let data = self.data.read();
        let versions = data
            .get(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;

        Ok(versions
            .range(range.start..=range.end)
            .map(|(timestamp, value)| Version::new(*timestamp, value.clone()))
            .collect())
    }
}

#[async_trait]
impl VersionedStore for InMemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Value> {
        let data = self.data.read();
        data.get(key)
            .and_then(|versions| versions.last_key_value())
            .map(|(_, value)| value.clone())
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))
    }

    async fn get_at(&self, key: &str, timestamp: Timestamp) -> StoreResult<Value> {
        let data = self.data.read();
        let versions = data
            .get(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;

        versions
            .range(..=timestamp)
            .next_back()
            .map(|(_, value)| value.clone())
            .ok_or_else(|| StoreError::NoVersionAt {
                key: key.to_string(),
                timestamp,
            })
    }

    async fn range(&self, key: &str, start: Timestamp, end: Timestamp) -> StoreResult<Series> {
        self.scan(key, TimeRange::new(start, end)?)
    }

    async fn from(&self, key: &str, start: Timestamp) -> StoreResult<Series> {
        self.scan(key, TimeRange::from(start))
    }

    async fn range_interval(
        &self,
        key: &str,
        start: Timestamp,
        end: Timestamp,
        interval: i64,
    ) -> StoreResult<Series> {
        let interval = Interval::new(interval)?;
        let series = self.scan(key, TimeRange::new(start, end)?)?;
        Ok(resample(&series, start, interval, self.policy))
    }

    async fn from_interval(
        &self,
        key: &str,
        start: Timestamp,
        interval: i64,
    ) -> StoreResult<Series> {
        let interval = Interval::new(interval)?;
        let series = self.scan(key, TimeRange::from(start))?;
        Ok(resample(&series, start, interval, self.policy))
    }
}

#[async_trait]
impl WritableStore for InMemoryStore {
    async fn put(&self, key: &str, value: Value) -> StoreResult<Timestamp> {
        let timestamp = now_millis();
        self.put_at(key, value, timestamp).await?;
        Ok(timestamp)
    }

    async fn put_at(&self, key: &str, value: Value, timestamp: Timestamp) -> StoreResult<()> {
        debug!("Writing version of '{}' at {}", key, timestamp);
        self.data
            .write()
            .entry(key.to_string())
            .or_default()
            .insert(timestamp, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn populated() -> InMemoryStore {
        let store = InMemoryStore::new();
        for (timestamp, value) in [(100, "a"), (110, "b"), (125, "c"), (150, "d")] {
            store.put_at("series", json!(value), timestamp).await.unwrap();
        }
        store
    }

    fn timestamps(series: &Series) -> Vec<i64> {
        series.iter().map(|v| v.timestamp).collect()
    }

    #[tokio::test]
    async fn test_get_returns_latest_version() {
        let store = populated().await;
        assert_eq!(store.get("series").await.unwrap(), json!("d"));
    }

    #[tokio::test]
    async fn test_unknown_key_is_not_found() {
        let store = populated().await;

        let err = store.get("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::KeyNotFound(ref k) if k == "missing"));
        assert!(store.range("missing", 0, 10).await.is_err());
        assert!(store.from("missing", 0).await.is_err());
    }

    #[tokio::test]
    async fn test_get_at_resolves_as_of() {
        let store = populated().await;

        assert_eq!(store.get_at("series", 110).await.unwrap(), json!("b"));
        assert_eq!(store.get_at("series", 124).await.unwrap(), json!("b"));
        assert_eq!(store.get_at("series", i64::MAX).await.unwrap(), json!("d"));

        let err = store.get_at("series", 99).await.unwrap_err();
        assert!(matches!(err, StoreError::NoVersionAt { timestamp: 99, .. }));
    }

    #[tokio::test]
    async fn test_range_is_closed_on_both_ends() {
        let store = populated().await;

        let series = store.range("series", 110, 150).await.unwrap();
        assert_eq!(timestamps(&series), vec![110, 125, 150]);

        let series = store.range("series", 111, 149).await.unwrap();
        assert_eq!(timestamps(&series), vec![125]);

        let series = store.range("series", 125, 125).await.unwrap();
        assert_eq!(timestamps(&series), vec![125]);
    }

    #[tokio::test]
    async fn test_range_with_no_matches_is_empty() {
        let store = populated().await;
        let series = store.range("series", 200, 300).await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_inverted_range_is_rejected() {
        let store = populated().await;
        let err = store.range("series", 150, 100).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidRange { .. }));
    }

    #[tokio::test]
    async fn test_from_is_open_ended() {
        let store = populated().await;
        let series = store.from("series", 111).await.unwrap();
        assert_eq!(timestamps(&series), vec![125, 150]);
    }

    #[tokio::test]
    async fn test_interval_reads_use_configured_policy() {
        let first = InMemoryStore::from_snapshot(populated().await.snapshot(), ResamplePolicy::First);
        let last = InMemoryStore::from_snapshot(populated().await.snapshot(), ResamplePolicy::Last);

        let series = first.range_interval("series", 100, 150, 30).await.unwrap();
        assert_eq!(timestamps(&series), vec![100, 150]);

        let series = last.range_interval("series", 100, 150, 30).await.unwrap();
        assert_eq!(timestamps(&series), vec![125, 150]);

        let series = first.from_interval("series", 105, 20).await.unwrap();
        assert_eq!(timestamps(&series), vec![110, 125, 150]);
    }

    #[tokio::test]
    async fn test_interval_reads_reject_non_positive_interval() {
        let store = populated().await;
        assert!(matches!(
            store.range_interval("series", 0, 10, 0).await,
            Err(StoreError::InvalidInterval(0))
        ));
        assert!(matches!(
            store.from_interval("series", 0, -1).await,
            Err(StoreError::InvalidInterval(-1))
        ));
    }

    #[tokio::test]
    async fn test_put_at_overwrites_same_timestamp() {
        let store = populated().await;
        store.put_at("series", json!("z"), 110).await.unwrap();

        assert_eq!(store.get_at("series", 110).await.unwrap(), json!("z"));
        assert_eq!(store.range("series", 0, 1000).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_put_stamps_with_wall_clock() {
        let store = InMemoryStore::new();
        let before = now_millis();
        let timestamp = store.put("clock", json!(1)).await.unwrap();

        assert!(timestamp >= before);
        assert_eq!(store.get("clock").await.unwrap(), json!(1));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip_through_json() {
        let store = populated().await;
        let json = serde_json::to_string(&store.snapshot()).unwrap();
        let snapshot: Snapshot = serde_json::from_str(&json).unwrap();
        let restored = InMemoryStore::from_snapshot(snapshot, ResamplePolicy::Spacing);

        assert_eq!(restored.policy(), ResamplePolicy::Spacing);
        assert_eq!(
            restored.range("series", 0, 1000).await.unwrap(),
            store.range("series", 0, 1000).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_load_snapshot_from_file() {
        let path = std::env::temp_dir().join(format!("histkv-seed-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"temp": [{"d": 3, "t": 30}, {"d": 1, "t": 10}, {"d": 2, "t": 10}]}"#,
        )
        .unwrap();

        let store = InMemoryStore::load_snapshot(&path, ResamplePolicy::Last).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(store.policy(), ResamplePolicy::Last);
        assert_eq!(store.get("temp").await.unwrap(), json!(3));
        // Duplicate timestamps keep the first entry
        assert_eq!(store.get_at("temp", 20).await.unwrap(), json!(1));
    }

    #[test]
    fn test_load_snapshot_missing_file_is_io_error() {
        let err = InMemoryStore::load_snapshot("/nonexistent/histkv.json", ResamplePolicy::First)
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
