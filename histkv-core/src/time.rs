//! Timestamps, closed ranges and resampling intervals
//!
//! Timestamps are caller-defined signed integers. They are usually Unix
//! milliseconds but nothing here assumes wall-clock meaning; they are only
//! compared and subtracted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{StoreError, StoreResult};

/// Position of a version in a key's history
pub type Timestamp = i64;

/// Current wall-clock time in Unix milliseconds, used for untimestamped writes
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

/// Closed time range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive)
    pub start: Timestamp,
    /// End time (inclusive)
    pub end: Timestamp,
}

impl TimeRange {
    /// Create a new closed range. A single-instant range (`start == end`) is valid.
    pub fn new(start: Timestamp, end: Timestamp) -> StoreResult<Self> {
        if start > end {
            return Err(StoreError::InvalidRange { start, end });
        }

        Ok(Self { start, end })
    }

    /// Range with no upper bound
    pub fn from(start: Timestamp) -> Self {
        Self {
            start,
            end: Timestamp::MAX,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Width of a resampling bucket. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval(i64);

impl Interval {
    pub fn new(width: i64) -> StoreResult<Self> {
        if width <= 0 {
            return Err(StoreError::InvalidInterval(width));
        }
        Ok(Self(width))
    }

    /// Index of the bucket containing `timestamp` when buckets start at `anchor`.
    ///
    /// Timestamps before the anchor land in negative buckets. Computed in
    /// 128-bit arithmetic so extreme timestamps cannot overflow.
    pub fn bucket(&self, anchor: Timestamp, timestamp: Timestamp) -> i128 {
        (timestamp as i128 - anchor as i128).div_euclid(self.0 as i128)
    }

    /// Whether `later` is at least one interval after `earlier`
    pub fn elapsed(&self, earlier: Timestamp, later: Timestamp) -> bool {
        later as i128 - earlier as i128 >= self.0 as i128
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range() {
        let range = TimeRange::new(1000, 2000).unwrap();

        assert_eq!(range.start, 1000);
        assert_eq!(range.end, 2000);
        assert_eq!(range.to_string(), "[1000, 2000]");
    }

    #[test]
    fn test_single_instant_range_is_valid() {
        let range = TimeRange::new(5, 5).unwrap();
        assert_eq!(range.start, range.end);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = TimeRange::new(10, 9).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRange { start: 10, end: 9 }));
    }

    #[test]
    fn test_open_range_has_no_upper_bound() {
        let range = TimeRange::from(-3);
        assert_eq!(range.start, -3);
        assert_eq!(range.end, i64::MAX);
        assert_eq!(range.to_string(), format!("[-3, {}]", i64::MAX));
    }

    #[test]
    fn test_interval_must_be_positive() {
        assert!(Interval::new(1).is_ok());
        assert!(matches!(
            Interval::new(0),
            Err(StoreError::InvalidInterval(0))
        ));
        assert!(matches!(
            Interval::new(-10),
            Err(StoreError::InvalidInterval(-10))
        ));
    }

    #[test]
    fn test_bucket_calculation() {
        let interval = Interval::new(10).unwrap();

        assert_eq!(interval.bucket(100, 100), 0);
        assert_eq!(interval.bucket(100, 109), 0);
        assert_eq!(interval.bucket(100, 110), 1);
        assert_eq!(interval.bucket(100, 99), -1);
        assert_eq!(interval.bucket(i64::MIN, i64::MAX), (u64::MAX / 10) as i128);
    }

    #[test]
    fn test_elapsed_handles_extremes() {
        let interval = Interval::new(5).unwrap();
        assert!(interval.elapsed(0, 5));
        assert!(!interval.elapsed(0, 4));
        assert!(interval.elapsed(i64::MIN, i64::MAX));
    }
}
