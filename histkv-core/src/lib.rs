//! # HistKV Core Library
//!
//! Shared library providing the data model and store contract for a
//! versioned, time-indexed key-value store.
//!
//! ## Features
//!
//! - **Data Types**: versions, ordered series, closed time ranges
//! - **Store Contract**: the six read operations every backend provides
//! - **Resampling**: interval bucketing with selectable representative policy
//! - **In-Memory Backend**: reference implementation, also used in tests
//!
//! ## Architecture
//!
//! Each key maps to a history of values indexed by signed 64-bit
//! timestamps. Backends hand results back as a [`Series`], which is always
//! ascending by timestamp, so consumers never deal with map-shaped or
//! unordered results.

pub mod error;
pub mod memory;
pub mod resample;
pub mod store;
pub mod time;
pub mod version;

// Re-export commonly used types
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryStore, Snapshot};
pub use resample::{resample, ResamplePolicy};
pub use store::{VersionedStore, WritableStore};
pub use time::{Interval, TimeRange, Timestamp};
pub use version::{Series, Version};

/// Version information for HistKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
