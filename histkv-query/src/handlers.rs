//! Request handlers of the query gateway

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{Method, StatusCode, Uri},
    response::Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::dispatch::{Operation, ReadQuery};
use crate::error::GatewayError;
use crate::metrics::StoreTimer;
use crate::params::{ParamError, PathParams};
use crate::response::{render, Payload, Rendered};
use crate::AppState;

/// Read endpoint shared by every route in the routing table.
///
/// Validates the path parameters for `operation`, makes at most one store
/// call and renders the envelope.
pub async fn read_handler(
    state: AppState,
    operation: Operation,
    path: Result<Path<HashMap<String, String>>, PathRejection>,
) -> Rendered {
    let params = match path {
        Ok(Path(params)) => PathParams::new(params),
        Err(rejection) => {
            return reject(&state, operation, ParamError::Malformed(rejection.body_text()));
        }
    };
    debug!("Received {} request: {:?}", operation, params);

    let query = match ReadQuery::parse(operation, &params) {
        Ok(query) => query,
        Err(err) => return reject(&state, operation, err),
    };

    let timer = StoreTimer::start();
    let result = query
        .execute(state.store.as_ref(), state.config.series_format)
        .await;

    let versions = match &result {
        Ok(payload) => {
            info!(
                "{} on '{}' returned {} version(s)",
                operation,
                query.key(),
                payload.len()
            );
            payload.len()
        }
        Err(err) if err.is_not_found() => {
            info!("{} on '{}' found nothing: {}", operation, query.key(), err);
            0
        }
        Err(err) => {
            warn!(
                "{} on '{}' failed [{}]: {}",
                operation,
                query.key(),
                err.category(),
                err
            );
            0
        }
    };

    let result = result.map_err(GatewayError::from);
    if let Err(err) = &result {
        state.metrics.record_error(err.category());
    }

    let rendered = render(result);
    if rendered.status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("{} on '{}': failed to encode response", operation, query.key());
        state.metrics.record_error(ENCODING_CATEGORY);
    }
    timer.finish(&state.metrics, rendered.status, versions);
    rendered
}

/// Error category counted when a response cannot be encoded
const ENCODING_CATEGORY: &str = "encoding";

fn reject(state: &AppState, operation: Operation, err: ParamError) -> Rendered {
    warn!("Rejected {} request: {}", operation, err);
    let err = GatewayError::from(err);
    state.metrics.record_rejection();
    state.metrics.record_error(err.category());
    render::<Payload>(Err(err))
}

/// Fallback for paths outside the routing table
pub async fn not_found_handler(uri: Uri) -> Rendered {
    debug!("No route for {}", uri.path());
    Rendered {
        status: StatusCode::NOT_FOUND,
        body: json!({ "Error": format!("no route for {}", uri.path()) }).to_string(),
    }
}

/// Fallback for routed paths requested with a method other than GET
pub async fn method_not_allowed_handler(method: Method, uri: Uri) -> Rendered {
    debug!("{} not allowed on {}", method, uri.path());
    Rendered {
        status: StatusCode::METHOD_NOT_ALLOWED,
        body: json!({ "Error": "method not allowed" }).to_string(),
    }
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "histkv-query",
        "version": histkv_core::VERSION,
        "path_prefix": state.config.path_prefix,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Metrics endpoint (Prometheus format)
pub async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.prometheus_format()
}
