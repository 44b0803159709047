//! Interval resampling of version histories
//!
//! Resampling reduces a series to at most one representative version per
//! fixed-width bucket. Buckets are anchored at the start of the query range,
//! so bucket `n` covers `[start + n * interval, start + (n + 1) * interval)`.
//! Representatives keep their original timestamp and value; nothing is
//! interpolated or aggregated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;
use crate::time::{Interval, Timestamp};
use crate::version::{Series, Version};

/// Which version represents a bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplePolicy {
    /// Earliest version in each bucket
    #[default]
    First,
    /// Latest version in each bucket
    Last,
    /// Greedy down-selection: keep a version only if it is at least one
    /// interval after the previously kept one
    Spacing,
}

impl ResamplePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResamplePolicy::First => "first",
            ResamplePolicy::Last => "last",
            ResamplePolicy::Spacing => "spacing",
        }
    }
}

impl fmt::Display for ResamplePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResamplePolicy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(ResamplePolicy::First),
            "last" => Ok(ResamplePolicy::Last),
            "spacing" => Ok(ResamplePolicy::Spacing),
            other => Err(StoreError::configuration(format!(
                "unknown resample policy '{}'",
                other
            ))),
        }
    }
}

/// Resample `series` into buckets of `interval` anchored at `anchor`.
///
/// The output is ascending by timestamp and is a subsequence of the input.
pub fn resample(
    series: &Series,
    anchor: Timestamp,
    interval: Interval,
    policy: ResamplePolicy,
) -> Series {
    let kept: Vec<Version> = match policy {
        ResamplePolicy::First => {
            let mut current = None;
            series
                .iter()
                .filter(|v| {
                    let bucket = interval.bucket(anchor, v.timestamp);
                    if current == Some(bucket) {
                        false
                    } else {
                        current = Some(bucket);
                        true
                    }
                })
                .cloned()
                .collect()
        }
        ResamplePolicy::Last => {
            let versions: Vec<&Version> = series.iter().collect();
            versions
                .iter()
                .enumerate()
                .filter(|(i, v)| match versions.get(i + 1) {
                    Some(next) => {
                        interval.bucket(anchor, next.timestamp)
                            != interval.bucket(anchor, v.timestamp)
                    }
                    None => true,
                })
                .map(|(_, v)| (*v).clone())
                .collect()
        }
        ResamplePolicy::Spacing => {
            let mut last_kept: Option<Timestamp> = None;
            series
                .iter()
                .filter(|v| match last_kept {
                    Some(previous) if !interval.elapsed(previous, v.timestamp) => false,
                    _ => {
                        last_kept = Some(v.timestamp);
                        true
                    }
                })
                .cloned()
                .collect()
        }
    };

    Series::from_versions(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(timestamps: &[i64]) -> Series {
        timestamps
            .iter()
            .map(|t| Version::new(*t, format!("v{}", t)))
            .collect()
    }

    fn timestamps(series: &Series) -> Vec<i64> {
        series.iter().map(|v| v.timestamp).collect()
    }

    #[test]
    fn test_first_policy_keeps_earliest_per_bucket() {
        let input = series(&[100, 103, 109, 110, 125, 129, 150]);
        let interval = Interval::new(10).unwrap();

        let result = resample(&input, 100, interval, ResamplePolicy::First);
        assert_eq!(timestamps(&result), vec![100, 110, 125, 150]);
    }

    #[test]
    fn test_last_policy_keeps_latest_per_bucket() {
        let input = series(&[100, 103, 109, 110, 125, 129, 150]);
        let interval = Interval::new(10).unwrap();

        let result = resample(&input, 100, interval, ResamplePolicy::Last);
        assert_eq!(timestamps(&result), vec![109, 110, 129, 150]);
    }

    #[test]
    fn test_spacing_policy_enforces_minimum_gap() {
        let input = series(&[100, 103, 109, 110, 125, 129, 150]);
        let interval = Interval::new(10).unwrap();

        let result = resample(&input, 100, interval, ResamplePolicy::Spacing);
        assert_eq!(timestamps(&result), vec![100, 110, 125, 150]);

        let result = resample(&input, 0, Interval::new(20).unwrap(), ResamplePolicy::Spacing);
        assert_eq!(timestamps(&result), vec![100, 125, 150]);
    }

    #[test]
    fn test_buckets_are_anchored_at_range_start() {
        let input = series(&[104, 106, 114]);
        let interval = Interval::new(10).unwrap();

        // Anchored at 100: 104 and 106 share a bucket
        let result = resample(&input, 100, interval, ResamplePolicy::First);
        assert_eq!(timestamps(&result), vec![104, 114]);

        // Anchored at 105: 104 | 106, 114 split differently
        let result = resample(&input, 105, interval, ResamplePolicy::First);
        assert_eq!(timestamps(&result), vec![104, 106]);
    }

    #[test]
    fn test_versions_before_anchor_get_their_own_buckets() {
        let input = series(&[-15, -12, -1, 0]);
        let interval = Interval::new(10).unwrap();

        let result = resample(&input, 0, interval, ResamplePolicy::First);
        assert_eq!(timestamps(&result), vec![-15, -1, 0]);
    }

    #[test]
    fn test_interval_of_one_keeps_everything() {
        let input = series(&[1, 2, 3, 4]);
        for policy in [
            ResamplePolicy::First,
            ResamplePolicy::Last,
            ResamplePolicy::Spacing,
        ] {
            let result = resample(&input, 0, Interval::new(1).unwrap(), policy);
            assert_eq!(result, input);
        }
    }

    #[test]
    fn test_empty_series() {
        let result = resample(
            &Series::new(),
            0,
            Interval::new(5).unwrap(),
            ResamplePolicy::Last,
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("first".parse::<ResamplePolicy>().unwrap(), ResamplePolicy::First);
        assert_eq!(" LAST ".parse::<ResamplePolicy>().unwrap(), ResamplePolicy::Last);
        assert_eq!(
            "spacing".parse::<ResamplePolicy>().unwrap(),
            ResamplePolicy::Spacing
        );
        assert!("median".parse::<ResamplePolicy>().is_err());
        assert_eq!(ResamplePolicy::default().to_string(), "first");
    }
}
