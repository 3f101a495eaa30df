pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod matching;
pub mod models;
pub mod progress;
pub mod search;
pub mod services;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tower_sessions::session_store::ExpiredDeletion;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    init_tracing(&config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            config.validate()?;
            serve(config).await
        }
        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("Wrote default config.toml");
            } else {
                println!("config.toml already exists, leaving it untouched");
            }
            Ok(())
        }
        Commands::CheckConfig => {
            config.validate()?;
            println!("Configuration OK");
            println!("  database: {}", config.general.database_path);
            println!("  port:     {}", config.server.port);
            println!("  search:   max edit distance {}", config.search.max_edit_distance);
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("Failed to install tracing subscriber")?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("whatdoing v{} starting...", env!("CARGO_PKG_VERSION"));

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    let state = api::create_app_state(config.clone(), prometheus_handle).await?;

    let cleanup_interval =
        std::time::Duration::from_secs(config.server.session_cleanup_interval_seconds.max(1));
    let cleanup_handle = tokio::spawn(
        state
            .session_store
            .clone()
            .continuously_delete_expired(cleanup_interval),
    );

    if !config.server.enabled {
        info!("HTTP server disabled in config, nothing to do");
        cleanup_handle.abort();
        return Ok(());
    }

    let port = config.server.port;
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web server running at http://{addr}");

    let app = api::router(state);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Web server error: {e}");
    }

    cleanup_handle.abort();
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Error listening for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Error listening for SIGTERM: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
