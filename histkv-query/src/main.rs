use anyhow::{Context, Result};
use histkv_core::{InMemoryStore, VersionedStore};
use histkv_query::{build_router, AppState, GatewayConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::load()?;
    config.validate()?;
    info!("Loaded configuration: {:?}", config);

    // Initialize store
    let policy = config.store.resample_policy;
    let store: Arc<dyn VersionedStore> = match &config.store.seed_file {
        Some(path) => Arc::new(
            InMemoryStore::load_snapshot(path, policy)
                .with_context(|| format!("Failed to load seed file {}", path.display()))?,
        ),
        None => Arc::new(InMemoryStore::with_policy(policy)),
    };
    info!("Initialized in-memory store (resample policy: {})", policy);

    let bind_address = config.bind_address.clone();
    let app = build_router(AppState::new(store, config));

    // Start server
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    let addr = listener.local_addr()?;
    info!("HistKV Query Gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

/// Listen for SIGTERM and SIGINT (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
