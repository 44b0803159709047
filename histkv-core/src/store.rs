//! Store abstraction for versioned key-value backends
//!
//! The query gateway is written against [`VersionedStore`] only, so any
//! backend (in-memory, disk-backed, remote) can sit behind it.
//!
//! # Design Philosophy
//!
//! This trait follows the "minimal core, optional extensions" pattern:
//! - Point reads and range reads must be implemented by every backend
//! - Interval reads have default implementations built on the range reads
//! - Writes live in the separate [`WritableStore`] extension trait, since
//!   the HTTP surface is read-only

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;
use crate::resample::{resample, ResamplePolicy};
use crate::time::{Interval, Timestamp};
use crate::version::Series;

/// Read capabilities of a versioned, time-indexed key-value store.
///
/// # Implementation Requirements
///
/// All implementations MUST:
/// - Return series in ascending timestamp order (guaranteed by [`Series`])
/// - Treat `range` bounds as a closed interval `[start, end]`
/// - Handle concurrent reads safely; the gateway adds no locking of its own
#[async_trait]
pub trait VersionedStore: Send + Sync {
    /// Latest value of `key`.
    async fn get(&self, key: &str) -> StoreResult<Value>;

    /// Value of `key` as of `timestamp`: the version with the greatest
    /// timestamp not after `timestamp`.
    async fn get_at(&self, key: &str, timestamp: Timestamp) -> StoreResult<Value>;

    /// All versions of `key` with `start <= t <= end`.
    async fn range(&self, key: &str, start: Timestamp, end: Timestamp) -> StoreResult<Series>;

    /// All versions of `key` with `t >= start`.
    async fn from(&self, key: &str, start: Timestamp) -> StoreResult<Series>;

    /// Versions of `[start, end]` reduced to one per `interval`-wide bucket.
    ///
    /// The default implementation applies [`ResamplePolicy::First`] to the
    /// result of [`range`](VersionedStore::range).
    async fn range_interval(
        &self,
        key: &str,
        start: Timestamp,
        end: Timestamp,
        interval: i64,
    ) -> StoreResult<Series> {
        let interval = Interval::new(interval)?;
        let series = self.range(key, start, end).await?;
        Ok(resample(&series, start, interval, ResamplePolicy::First))
    }

    /// Versions from `start` onward reduced to one per `interval`-wide bucket.
    async fn from_interval(
        &self,
        key: &str,
        start: Timestamp,
        interval: i64,
    ) -> StoreResult<Series> {
        let interval = Interval::new(interval)?;
        let series = self.from(key, start).await?;
        Ok(resample(&series, start, interval, ResamplePolicy::First))
    }
}

/// Optional: write operations
///
/// Backends that accept writes implement this alongside [`VersionedStore`].
#[async_trait]
pub trait WritableStore: VersionedStore {
    /// Record `value` as the newest version of `key`, stamped with the
    /// current wall-clock time in milliseconds. Returns the timestamp used.
    async fn put(&self, key: &str, value: Value) -> StoreResult<Timestamp>;

    /// Record `value` for `key` at an explicit timestamp, replacing any
    /// version already stored there.
    async fn put_at(&self, key: &str, value: Value, timestamp: Timestamp) -> StoreResult<()>;
}
