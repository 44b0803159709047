//! HistKV Query Gateway Library
//!
//! This library provides the HTTP read surface of the versioned key-value
//! store: path parameter validation, the routing table, dispatch to a
//! [`VersionedStore`](histkv_core::VersionedStore), and the JSON response
//! envelope.

// Core modules
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod params;
pub mod response;
pub mod routes;

// Re-export commonly used types
pub use config::GatewayConfig;
pub use dispatch::{Operation, ReadQuery};
pub use error::GatewayError;
pub use response::{render, Envelope, Payload, Rendered, SeriesFormat};
pub use routes::{build_router, ROUTES};

use std::sync::Arc;

/// Application state shared across handlers.
///
/// Holds no mutable gateway state; the store owns its own concurrency.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn histkv_core::VersionedStore>,
    pub config: Arc<GatewayConfig>,
    pub metrics: Arc<metrics::GatewayMetrics>,
}

impl AppState {
    pub fn new(store: Arc<dyn histkv_core::VersionedStore>, config: GatewayConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            metrics: Arc::new(metrics::GatewayMetrics::new()),
        }
    }
}
