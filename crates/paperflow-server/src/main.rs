//! paperflow server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, runs the paper-status repair pass, and serves the JSON API over
//! HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use paperflow_core::Workflow;
use paperflow_server::{ServerConfig, expand_tilde};
use paperflow_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "paperflow assignment and scrutiny server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Repair stale assignment paper statuses and exit.
  #[arg(long)]
  reconcile_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg =
    ServerConfig::load(&cli.config).context("failed to read configuration")?;
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let workflow = Arc::new(Workflow::new(store));

  let repaired = workflow
    .reconcile()
    .await
    .context("paper-status repair pass failed")?;
  tracing::info!(repaired, "paper-status repair pass complete");
  if cli.reconcile_only {
    return Ok(());
  }

  let app = paperflow_server::app(workflow);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
