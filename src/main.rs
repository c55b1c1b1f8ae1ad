// offline-cache - Install-time precache and cache-first offline proxy
// Author: kelexine (https://github.com/kelexine)

use anyhow::{Context, Result};
use clap::Parser;
use offline_cache::cache::{CacheStorage, DiskStorage, MemoryStorage};
use offline_cache::cli::Args;
use offline_cache::config::AppConfig;
use offline_cache::network::HttpFetcher;
use offline_cache::server::create_router;
use offline_cache::utils::{logging, retry};
use offline_cache::worker::{HandlerConfig, OfflineCacheHandler};
use reqwest::Url;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(origin) = args.origin {
        config.upstream.origin = origin;
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting offline-cache v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Storage and upstream client
    let storage: Arc<dyn CacheStorage> = if args.memory {
        info!("Using in-memory cache storage");
        Arc::new(MemoryStorage::new())
    } else {
        Arc::new(DiskStorage::new(&config.cache.storage_dir).await?)
    };
    let fetcher = Arc::new(HttpFetcher::new(&config.upstream)?);
    let scope = Url::parse(&config.upstream.origin)
        .with_context(|| format!("invalid upstream origin {}", config.upstream.origin))?;

    let handler = OfflineCacheHandler::new(
        storage,
        fetcher,
        scope,
        HandlerConfig::from(&config.cache),
    );

    // Phase 4: Install signal; the handler is only activated once it succeeds
    let report = retry::with_retry(
        "Install",
        config.cache.install_retries,
        retry::create_backoff(),
        || handler.install(),
    )
    .await
    .context("install failed; handler not activated")?;
    info!("Cached {} asset(s) in {}", report.stored, report.cache_name);

    if args.install_only {
        return Ok(());
    }

    // Phase 5: Build and start HTTP server
    let app = create_router(handler);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Serving {} on {}", config.upstream.origin, addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
