use books_service::config::{BackendType, Config};
use books_service::create_router;
use books_service::models::storage::{Backend, MemoryBackend};
use books_service::services::elasticsearch::ElasticsearchBackend;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("books_service=info,tower_http=info")),
        )
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let backend: Backend = match (config.backend, config.elastic_url.as_deref()) {
        (BackendType::Elasticsearch, Some(elastic_url)) => {
            info!("Using Elasticsearch backend at {}", elastic_url);
            match ElasticsearchBackend::new(elastic_url, &config.index) {
                Ok(backend) => Arc::new(backend),
                Err(e) => {
                    error!("Error creating the client: {}", e);
                    std::process::exit(1);
                }
            }
        }
        (BackendType::Elasticsearch, None) => {
            error!("ELASTIC_URL is required for the Elasticsearch backend");
            std::process::exit(1);
        }
        (BackendType::Memory, _) => {
            warn!("Using in-memory backend, documents are lost on shutdown");
            Arc::new(MemoryBackend::new(&config.index))
        }
    };

    if let Err(e) = backend.test_connection().await {
        error!("Failed to connect to index backend: {}", e);
        std::process::exit(1);
    }
    info!("Index backend connection successful, using index {}", config.index);

    let app = create_router(backend);

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Books service starting on {}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Books service stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
