//! Routing table of the query gateway
//!
//! | Path                                   | Operation     |
//! |----------------------------------------|---------------|
//! | `/:key/range/:start/:end/:interval`    | RangeInterval |
//! | `/:key/range/:start/:end`              | Range         |
//! | `/:key/range/:start`                   | From (alias)  |
//! | `/:key/from/:start/:interval`          | FromInterval  |
//! | `/:key/from/:start`                    | From          |
//! | `/:key/at/:timestamp`                  | GetAt         |
//! | `/:key`                                | Get           |
//!
//! Routes sharing a prefix are registered longest first. A single-bound
//! `range` is an alias of `from`.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Router,
};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::dispatch::Operation;
use crate::handlers::{
    health_handler, method_not_allowed_handler, metrics_handler, not_found_handler, read_handler,
};
use crate::AppState;

/// One entry of the routing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub operation: Operation,
}

impl Route {
    const fn new(path: &'static str, operation: Operation) -> Self {
        Self { path, operation }
    }

    /// Number of path segments after the key
    pub fn suffix_len(&self) -> usize {
        self.path.split('/').filter(|s| !s.is_empty()).count() - 1
    }
}

/// Read routes in registration order
pub const ROUTES: &[Route] = &[
    Route::new("/:key/range/:start/:end/:interval", Operation::RangeInterval),
    Route::new("/:key/range/:start/:end", Operation::Range),
    Route::new("/:key/from/:start/:interval", Operation::FromInterval),
    Route::new("/:key/range/:start", Operation::From),
    Route::new("/:key/from/:start", Operation::From),
    Route::new("/:key/at/:timestamp", Operation::GetAt),
    Route::new("/:key", Operation::Get),
];

/// Mount every read route under `prefix`. GET only; other methods get an
/// error envelope with 405.
pub fn attach_read_routes(mut router: Router<AppState>, prefix: &str) -> Router<AppState> {
    for route in ROUTES {
        let operation = route.operation;
        let path = format!("{}{}", prefix, route.path);
        debug!("Registering GET {} -> {}", path, operation);

        router = router.route(
            &path,
            get(
                move |State(state): State<AppState>,
                      path: Result<Path<HashMap<String, String>>, PathRejection>| async move {
                    read_handler(state, operation, path).await
                },
            )
            .fallback(method_not_allowed_handler),
        );
    }
    router
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new().route(
        &config.metrics.health_path,
        get(health_handler).fallback(method_not_allowed_handler),
    );
    if config.metrics.enable_prometheus {
        router = router.route(
            &config.metrics.metrics_path,
            get(metrics_handler).fallback(method_not_allowed_handler),
        );
    }

    attach_read_routes(router, &config.path_prefix)
        .fallback(not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
