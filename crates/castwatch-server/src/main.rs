//! castwatch server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `CASTWATCH_*` environment variables, opens the SQLite store, starts the
//! poll scheduler, and serves the JSON API until interrupted.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use castwatch_api::{ApiState, api_router};
use castwatch_engine::{Engine, LogSink, Scheduler};
use castwatch_server::{ServerConfig, open_store};
use castwatch_tmdb::TmdbClient;
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Follow actors and hear about their new releases")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  let store = Arc::new(open_store(&cfg).await?);
  let provider = Arc::new(
    TmdbClient::new(cfg.tmdb_config()).context("failed to build TMDB client")?,
  );

  // Poller.
  let engine = Engine::new(
    provider.clone(),
    store.clone(),
    store.clone(),
    Arc::new(LogSink),
    cfg.engine_config(),
  );
  let scheduler = Scheduler::new(Arc::new(engine), cfg.poll_interval()).spawn();

  // API.
  let app = api_router(ApiState::new(store, provider)).layer(TraceLayer::new_for_http());
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  let served = axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error");

  scheduler.shutdown().await;
  tracing::info!("shutdown complete");
  served
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for ctrl-c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
    _ = terminate => tracing::info!("received SIGTERM, shutting down"),
  }
}
