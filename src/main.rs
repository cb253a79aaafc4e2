use anyhow::{Context, Result};
use axum::serve;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, warn, Level};
use trackgo_sync::core::config::Config;
use trackgo_sync::core::state::{AppState, ClientState};
use trackgo_sync::core::{routes, startup, tracing_init};
use trackgo_sync::stores::local_store::LocalStore;
use trackgo_sync::tracking::map_binder::{MapBinder, MapSettings};
use trackgo_sync::tracking::memory_map::MemoryMap;
use trackgo_sync::tracking::reconciler::FallbackArea;
use trackgo_sync::tracking::view::TrackingView;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("config.toml")
    };

    // Load and validate configuration
    let config = Config::from_file(&config_path).context(format!(
        "Failed to load configuration from '{}'. \
        If this is your first run, copy config.example.toml to config.toml and adjust the values.",
        config_path.display()
    ))?;

    tracing_init::init_tracing(&config.logging)?;

    // One logical thread; work interleaves only at network I/O and timers
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, config_path))
}

async fn async_main(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        backend = %config.api.base_url,
        poll_interval_secs = config.tracking.poll_interval_secs,
        port = ?config.server.port,
        log_level = %config.logging.level,
        "trackgo sync client starting"
    );

    let storage = LocalStore::open(&config.storage.path)
        .context(format!("Failed to open storage at {}", config.storage.path.display()))?;

    info!(path = %config.storage.path.display(), entries = storage.len(), "Storage opened");

    let client = Arc::new(ClientState::new(config.clone(), storage)?);

    let role = match startup::authenticate(&client, &config.auth).await {
        Ok(role) => role,
        Err(e) => {
            error!(error = %e, "Authentication failed, continuing unauthenticated");
            None
        }
    };

    startup::populate(&client, role).await;

    let view = if startup::tracks_fleet(role) {
        let binder = MapBinder::<MemoryMap, _>::open(MapSettings::from_config(&config.map));
        Some(TrackingView::start(
            client.tracking_sources(),
            binder,
            FallbackArea::from_config(&config.tracking),
            Duration::from_secs(config.tracking.poll_interval_secs),
            Arc::clone(&client.metrics),
        ))
    } else {
        info!("Live tracking is not available to user sessions");
        None
    };

    let state = Arc::new(AppState::new(
        Arc::clone(&client),
        view.as_ref().map(|view| view.handle()),
    ));

    match config.server.port {
        Some(port) => {
            let app = routes::build_router(state).layer(
                ServiceBuilder::new().layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                ),
            );

            let addr = format!("127.0.0.1:{}", port);
            let listener = TcpListener::bind(&addr)
                .await
                .context(format!("Failed to bind status listener to {}", addr))?;

            info!(address = %addr, "Status surface listening");

            serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Status server error")?;
        }
        None => {
            info!("Status surface disabled, waiting for shutdown signal");
            shutdown_signal().await;
        }
    }

    if let Some(mut view) = view {
        view.dispose();
    }

    if let Err(e) = client.storage.flush() {
        warn!(error = %e, "Failed to flush storage on shutdown");
    }

    let metrics = client.metrics.snapshot();
    info!(
        fetches = metrics.fetches_started,
        failed = metrics.fetches_failed,
        polls = metrics.polls,
        uptime_seconds = metrics.uptime_seconds,
        "Shutting down gracefully"
    );

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

    info!("Shutdown signal received, starting graceful shutdown");
}
