//! Error taxonomy of the query gateway

use axum::http::StatusCode;
use histkv_core::StoreError;
use thiserror::Error;

use crate::params::ParamError;

/// Every way a read request can fail before a response is rendered
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed path parameter, detected locally. The store is never called.
    #[error(transparent)]
    InvalidParameter(#[from] ParamError),

    /// Any failure reported by the store. Not-found and backend failures are
    /// deliberately not told apart.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GatewayError {
    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            GatewayError::Store(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Get the error category for monitoring/metrics
    pub fn category(&self) -> &'static str {
        match self {
            GatewayError::InvalidParameter(_) => "invalid_parameter",
            GatewayError::Store(err) => err.category(),
        }
    }
}
